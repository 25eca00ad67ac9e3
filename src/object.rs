//! The object model and its generic property protocol (section 8.12).
//!
//! Objects are reference-counted handles around interior-mutable data. No
//! borrow is ever held across a callable invocation: descriptors are cloned
//! out of the cell first, so getters and setters may re-enter the protocol
//! on the same object freely.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::arguments::Arguments;
use crate::array::{self, IndexedElements};
use crate::context::{Context, Shape};
use crate::error::{Error, ErrorKind, reject};
use crate::property::PropertyDescriptor;
use crate::symbol::{self, Symbol};
use crate::types::JsValue;

pub type NativeFunction = Rc<dyn Fn(&mut Context, &Arguments, &mut Error) -> JsValue>;

#[derive(Clone)]
pub enum JsFunction {
    Native(String, usize, NativeFunction),
}

impl JsFunction {
    pub fn native(
        name: impl Into<String>,
        arity: usize,
        f: impl Fn(&mut Context, &Arguments, &mut Error) -> JsValue + 'static,
    ) -> Self {
        JsFunction::Native(name.into(), arity, Rc::new(f))
    }

    pub fn name(&self) -> &str {
        match self {
            JsFunction::Native(name, _, _) => name,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            JsFunction::Native(_, arity, _) => *arity,
        }
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsFunction::Native(name, arity, _) => {
                write!(f, "JsFunction::Native({name:?}, {arity})")
            }
        }
    }
}

// §8 ToPrimitive preferred type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hint {
    String,
    Number,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumerationMode {
    ExcludeNotEnumerable,
    IncludeNotEnumerable,
}

pub struct JsObjectData {
    pub class_name: String,
    pub prototype: Option<JsObject>,
    pub extensible: bool,
    pub callable: Option<JsFunction>,
    pub primitive_value: Option<JsValue>,
    pub(crate) elements: Option<IndexedElements>,
    properties: FxHashMap<Symbol, PropertyDescriptor>,
    property_order: Vec<Symbol>,
}

impl JsObjectData {
    pub(crate) fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            prototype: None,
            extensible: true,
            callable: None,
            primitive_value: None,
            elements: None,
            properties: FxHashMap::default(),
            property_order: Vec::new(),
        }
    }

    pub(crate) fn own(&self, name: Symbol) -> Option<&PropertyDescriptor> {
        self.properties.get(&name)
    }

    pub(crate) fn own_names(&self) -> &[Symbol] {
        &self.property_order
    }

    pub(crate) fn insert(&mut self, name: Symbol, desc: PropertyDescriptor) {
        if self.properties.insert(name, desc).is_none() {
            self.property_order.push(name);
        }
    }

    pub(crate) fn remove(&mut self, name: Symbol) {
        if self.properties.remove(&name).is_some() {
            self.property_order.retain(|existing| *existing != name);
        }
    }
}

#[derive(Clone)]
pub struct JsObject {
    data: Rc<RefCell<JsObjectData>>,
}

impl JsObject {
    pub fn new_plain() -> JsObject {
        JsObject::from_data(JsObjectData::new("Object"))
    }

    /// Factory seeded from a shape: class identity plus prototype.
    pub fn with_shape(shape: &Shape) -> JsObject {
        let mut data = JsObjectData::new(&shape.class_name);
        data.prototype = shape.prototype.clone();
        JsObject::from_data(data)
    }

    pub fn new_native_function(
        name: impl Into<String>,
        arity: usize,
        f: impl Fn(&mut Context, &Arguments, &mut Error) -> JsValue + 'static,
    ) -> JsObject {
        let mut data = JsObjectData::new("Function");
        data.callable = Some(JsFunction::native(name, arity, f));
        JsObject::from_data(data)
    }

    pub(crate) fn from_data(data: JsObjectData) -> JsObject {
        JsObject {
            data: Rc::new(RefCell::new(data)),
        }
    }

    pub(crate) fn data(&self) -> Ref<'_, JsObjectData> {
        self.data.borrow()
    }

    pub(crate) fn data_mut(&self) -> RefMut<'_, JsObjectData> {
        self.data.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub fn class_name(&self) -> String {
        self.data().class_name.clone()
    }

    pub fn prototype(&self) -> Option<JsObject> {
        self.data().prototype.clone()
    }

    /// Acyclicity of the chain is the caller's invariant, checked at
    /// assignment time by the runtime, not here.
    pub fn set_prototype(&self, prototype: Option<JsObject>) {
        self.data_mut().prototype = prototype;
    }

    pub fn is_extensible(&self) -> bool {
        self.data().extensible
    }

    pub fn set_extensible(&self, extensible: bool) {
        self.data_mut().extensible = extensible;
    }

    pub fn is_callable(&self) -> bool {
        self.data().callable.is_some()
    }

    pub fn set_callable(&self, callable: Option<JsFunction>) {
        self.data_mut().callable = callable;
    }

    pub fn primitive_value(&self) -> Option<JsValue> {
        self.data().primitive_value.clone()
    }

    pub fn is_array(&self) -> bool {
        self.data().elements.is_some()
    }

    pub fn call(&self, ctx: &mut Context, args: &Arguments, e: &mut Error) -> JsValue {
        let callable = self.data().callable.clone();
        match callable {
            Some(JsFunction::Native(_, _, func)) => func(ctx, args, e),
            None => {
                e.report(ErrorKind::Type, "object is not callable");
                JsValue::Undefined
            }
        }
    }

    // §8.12.1 [[GetOwnProperty]] — single-level lookup, no chain walk.
    pub fn get_own_property(&self, name: Symbol) -> Option<PropertyDescriptor> {
        let data = self.data();
        if let Some(elements) = &data.elements {
            if name == symbol::LENGTH {
                return Some(PropertyDescriptor::data(
                    JsValue::Number(elements.length() as f64),
                    elements.writable(),
                    false,
                    false,
                ));
            }
            if let Some(index) = name.array_index()
                && elements.is_dense()
            {
                return elements.own(index);
            }
        }
        data.own(name).cloned()
    }

    // §8.12.2 [[GetProperty]] — iterative, never mutates visited objects.
    pub fn get_property(&self, name: Symbol) -> Option<PropertyDescriptor> {
        let mut object = self.clone();
        loop {
            if let Some(desc) = object.get_own_property(name) {
                return Some(desc);
            }
            let prototype = object.data().prototype.clone();
            match prototype {
                Some(proto) => object = proto,
                None => return None,
            }
        }
    }

    // §8.12.3 [[Get]]
    pub fn get(&self, ctx: &mut Context, name: Symbol, e: &mut Error) -> JsValue {
        let Some(desc) = self.get_property(name) else {
            return JsValue::Undefined;
        };
        if desc.is_data_descriptor() {
            return desc.value.unwrap_or(JsValue::Undefined);
        }
        let Some(getter) = desc.getter_object().cloned() else {
            return JsValue::Undefined;
        };
        let args = Arguments::scoped(ctx.stack(), 0, e);
        if e.occurred() {
            return JsValue::Undefined;
        }
        args.set_this_binding(JsValue::Object(self.clone()));
        getter.call(ctx, &args, e)
    }

    // §8.12.4 [[CanPut]]
    pub fn can_put(&self, name: Symbol) -> bool {
        if let Some(own) = self.get_own_property(name) {
            if own.is_accessor_descriptor() {
                return own.setter_object().is_some();
            }
            return own.writable == Some(true);
        }
        let prototype = self.data().prototype.clone();
        let Some(prototype) = prototype else {
            return self.is_extensible();
        };
        match prototype.get_property(name) {
            None => self.is_extensible(),
            Some(inherited) => {
                if inherited.is_accessor_descriptor() {
                    inherited.setter_object().is_some()
                } else {
                    inherited.writable == Some(true)
                }
            }
        }
    }

    // §8.12.9 [[DefineOwnProperty]]; arrays intercept length and indexes
    // (section 15.4.5.1) before the generic reconciliation runs.
    pub fn define_own_property(
        &self,
        ctx: &mut Context,
        name: Symbol,
        desc: &PropertyDescriptor,
        throwable: bool,
        e: &mut Error,
    ) -> bool {
        if self.is_array() {
            if name == symbol::LENGTH {
                return array::define_length_property(self, ctx, desc, throwable, e);
            }
            if let Some(index) = name.array_index() {
                return array::define_indexed_property(self, index, desc, throwable, e);
            }
        }
        self.define_own_generic(name, desc, throwable, e)
    }

    pub(crate) fn define_own_generic(
        &self,
        name: Symbol,
        desc: &PropertyDescriptor,
        throwable: bool,
        e: &mut Error,
    ) -> bool {
        let current = self.data().own(name).cloned();
        let Some(current) = current else {
            if !self.data().extensible {
                return reject(throwable, e, "object not extensible");
            }
            self.data_mut()
                .insert(name, PropertyDescriptor::set_default(desc));
            return true;
        };

        // step 5: pure probe
        if desc.is_absent() {
            return true;
        }
        // step 6: no observable change requested
        if desc.equals(&current) {
            return true;
        }

        // step 7
        if current.configurable == Some(false) {
            if desc.configurable == Some(true) {
                return reject(
                    throwable,
                    e,
                    "changing [[Configurable]] of unconfigurable property not allowed",
                );
            }
            if desc.enumerable.is_some() && desc.enumerable != current.enumerable {
                return reject(
                    throwable,
                    e,
                    "changing [[Enumerable]] of unconfigurable property not allowed",
                );
            }
        }

        if desc.is_generic_descriptor() {
            // step 8: no further validation
        } else if current.is_data_descriptor() != desc.is_data_descriptor() {
            // step 9: the switch is permitted precisely because current is
            // configurable
            if current.configurable == Some(false) {
                return reject(
                    throwable,
                    e,
                    "changing descriptor type of unconfigurable property not allowed",
                );
            }
            // the converted property keeps enumerable/configurable only
            let preserved = PropertyDescriptor {
                enumerable: current.enumerable,
                configurable: current.configurable,
                ..Default::default()
            };
            let converted = PropertyDescriptor::set_default(&PropertyDescriptor::merge(
                desc, &preserved,
            ));
            self.data_mut().insert(name, converted);
            return true;
        } else if current.is_data_descriptor() {
            // step 10
            if current.configurable == Some(false) && current.writable == Some(false) {
                if desc.writable == Some(true) {
                    return reject(
                        throwable,
                        e,
                        "changing [[Writable]] of unconfigurable property not allowed",
                    );
                }
                if let Some(value) = &desc.value {
                    let current_value = current.value.clone().unwrap_or(JsValue::Undefined);
                    if !value.same_value(&current_value) {
                        return reject(
                            throwable,
                            e,
                            "changing [[Value]] of readonly property not allowed",
                        );
                    }
                }
            }
        } else if current.configurable == Some(false) {
            // step 11
            if accessor_half_changes(&desc.get, &current.get)
                || accessor_half_changes(&desc.set, &current.set)
            {
                return reject(
                    throwable,
                    e,
                    "changing [[Set]] or [[Get]] of unconfigurable property not allowed",
                );
            }
        }

        self.data_mut()
            .insert(name, PropertyDescriptor::merge(desc, &current));
        true
    }

    // §8.12.5 [[Put]]
    pub fn put(
        &self,
        ctx: &mut Context,
        name: Symbol,
        value: JsValue,
        throwable: bool,
        e: &mut Error,
    ) -> bool {
        if !self.can_put(name) {
            return reject(throwable, e, "put failed");
        }
        if let Some(own) = self.get_own_property(name)
            && own.is_data_descriptor()
        {
            // attributes stay absent so the existing ones are retained
            return self.define_own_property(
                ctx,
                name,
                &PropertyDescriptor::value_only(value),
                throwable,
                e,
            );
        }
        if let Some(inherited) = self.get_property(name)
            && inherited.is_accessor_descriptor()
        {
            // can_put already established the setter exists
            let Some(setter) = inherited.setter_object().cloned() else {
                return reject(throwable, e, "put failed");
            };
            let args = Arguments::scoped(ctx.stack(), 1, e);
            if e.occurred() {
                return false;
            }
            args.set_this_binding(JsValue::Object(self.clone()));
            args.set_arg(0, value);
            setter.call(ctx, &args, e);
            return !e.occurred();
        }
        self.define_own_property(
            ctx,
            name,
            &PropertyDescriptor::data(value, true, true, true),
            throwable,
            e,
        )
    }

    // §8.12.6 [[HasProperty]]
    pub fn has_property(&self, name: Symbol) -> bool {
        self.get_property(name).is_some()
    }

    pub fn has_own_property(&self, name: Symbol) -> bool {
        self.get_own_property(name).is_some()
    }

    // §8.12.7 [[Delete]]
    pub fn delete(&self, name: Symbol, throwable: bool, e: &mut Error) -> bool {
        if self.is_array() {
            if name == symbol::LENGTH {
                return reject(throwable, e, "delete failed");
            }
            if let Some(index) = name.array_index() {
                let dense = self
                    .data()
                    .elements
                    .as_ref()
                    .is_some_and(|elements| elements.is_dense());
                if dense {
                    return array::delete_dense_element(self, index);
                }
            }
        }
        let desc = self.data().own(name).cloned();
        let Some(desc) = desc else {
            return true;
        };
        if desc.configurable == Some(true) {
            self.data_mut().remove(name);
            return true;
        }
        reject(throwable, e, "delete failed")
    }

    // §8.12.8 [[DefaultValue]]
    pub fn default_value(&self, ctx: &mut Context, hint: Hint, e: &mut Error) -> JsValue {
        let order = match hint {
            Hint::String => [symbol::TO_STRING, symbol::VALUE_OF],
            Hint::Number | Hint::None => [symbol::VALUE_OF, symbol::TO_STRING],
        };
        for name in order {
            let method = self.get(ctx, name, e);
            if e.occurred() {
                return JsValue::Undefined;
            }
            let Some(func) = method.as_object().filter(|obj| obj.is_callable()).cloned() else {
                continue;
            };
            let args = Arguments::scoped(ctx.stack(), 0, e);
            if e.occurred() {
                return JsValue::Undefined;
            }
            args.set_this_binding(JsValue::Object(self.clone()));
            let result = func.call(ctx, &args, e);
            if e.occurred() {
                return JsValue::Undefined;
            }
            if result.is_primitive() {
                return result;
            }
        }
        e.report(ErrorKind::Type, "invalid default value");
        JsValue::Undefined
    }

    /// Own names in enumeration order: array indices ascending, then
    /// `length` (include mode only), then named properties in insertion
    /// order. Names already collected at a shallower level are skipped.
    pub fn get_own_property_names(&self, names: &mut Vec<Symbol>, mode: EnumerationMode) {
        let include_all = mode == EnumerationMode::IncludeNotEnumerable;
        let data = self.data();
        if let Some(elements) = &data.elements {
            let mut indices: Vec<u32> = if elements.is_dense() {
                elements.own_indices()
            } else {
                data.own_names()
                    .iter()
                    .filter(|name| {
                        include_all
                            || data
                                .own(**name)
                                .is_some_and(|desc| desc.enumerable == Some(true))
                    })
                    .filter_map(|name| name.array_index())
                    .collect()
            };
            indices.sort_unstable();
            for index in indices {
                push_unique(names, Symbol::Index(index));
            }
            if include_all {
                push_unique(names, symbol::LENGTH);
            }
            for &name in data.own_names() {
                if name.is_array_index() {
                    continue;
                }
                let enumerable = data
                    .own(name)
                    .is_some_and(|desc| desc.enumerable == Some(true));
                if enumerable || include_all {
                    push_unique(names, name);
                }
            }
            return;
        }
        for &name in data.own_names() {
            let enumerable = data
                .own(name)
                .is_some_and(|desc| desc.enumerable == Some(true));
            if enumerable || include_all {
                push_unique(names, name);
            }
        }
    }

    /// Own names first, then each prototype level, shallower wins.
    pub fn get_property_names(&self, names: &mut Vec<Symbol>, mode: EnumerationMode) {
        self.get_own_property_names(names, mode);
        let mut object = self.data().prototype.clone();
        while let Some(proto) = object {
            proto.get_own_property_names(names, mode);
            object = proto.data().prototype.clone();
        }
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsObject({})", self.data().class_name)
    }
}

fn push_unique(names: &mut Vec<Symbol>, name: Symbol) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn accessor_half_changes(requested: &Option<JsValue>, current: &Option<JsValue>) -> bool {
    match requested {
        None => false,
        Some(requested) => match current {
            Some(current) => !requested.same_value(current),
            None => !requested.is_undefined(),
        },
    }
}
