//! Property descriptors with tri-state attributes.
//!
//! Every field is an `Option`: `None` means the attribute is absent, which
//! is distinct from an explicit `false`. Absence means "leave unchanged"
//! during `merge` and "use the default" during `set_default`.

use crate::object::JsObject;
use crate::types::JsValue;

#[derive(Clone, Debug, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<JsValue>,
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            get: None,
            set: None,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    pub fn data_default(value: JsValue) -> Self {
        Self::data(value, true, true, true)
    }

    pub fn accessor(
        get: Option<JsValue>,
        set: Option<JsValue>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            value: None,
            writable: None,
            get,
            set,
            enumerable: Some(enumerable),
            configurable: Some(configurable),
        }
    }

    /// Value-only descriptor: attributes stay absent so an update through
    /// DefineOwnProperty retains the current ones.
    pub fn value_only(value: JsValue) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// No field present at all: DefineOwnProperty treats this as a probe.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
            && self.writable.is_none()
            && self.get.is_none()
            && self.set.is_none()
            && self.enumerable.is_none()
            && self.configurable.is_none()
    }

    /// A stored accessor half counts only when it is an actual object;
    /// absent or explicitly-undefined means "no getter"/"no setter".
    pub fn getter_object(&self) -> Option<&JsObject> {
        match &self.get {
            Some(JsValue::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    pub fn setter_object(&self) -> Option<&JsObject> {
        match &self.set {
            Some(JsValue::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    /// One-directional comparison (section 8.12.9 step 6): every field
    /// `self` defines must also be defined on `other` with the same value.
    /// Fields absent on `self` do not participate; a field present on
    /// `self` but absent on `other` compares unequal, so a kind switch is
    /// never mistaken for a no-op. Values compare with SameValue, so
    /// `+0`/`-0` differ and `NaN` equals itself.
    pub fn equals(&self, other: &PropertyDescriptor) -> bool {
        defined_same(&self.value, &other.value)
            && self.writable.is_none_or(|w| other.writable == Some(w))
            && defined_same(&self.get, &other.get)
            && defined_same(&self.set, &other.set)
            && self.enumerable.is_none_or(|v| other.enumerable == Some(v))
            && self
                .configurable
                .is_none_or(|v| other.configurable == Some(v))
    }

    /// Section 8.12.9 step 12: fields absent on `desc` keep `current`'s.
    pub fn merge(desc: &PropertyDescriptor, current: &PropertyDescriptor) -> PropertyDescriptor {
        PropertyDescriptor {
            value: desc.value.clone().or_else(|| current.value.clone()),
            writable: desc.writable.or(current.writable),
            get: desc.get.clone().or_else(|| current.get.clone()),
            set: desc.set.clone().or_else(|| current.set.clone()),
            enumerable: desc.enumerable.or(current.enumerable),
            configurable: desc.configurable.or(current.configurable),
        }
    }

    /// Initial-creation defaults: absent attributes become `false`, and a
    /// non-accessor descriptor is promoted to Data with value undefined.
    pub fn set_default(desc: &PropertyDescriptor) -> PropertyDescriptor {
        let mut filled = desc.clone();
        if !filled.is_accessor_descriptor() {
            if filled.value.is_none() {
                filled.value = Some(JsValue::Undefined);
            }
            if filled.writable.is_none() {
                filled.writable = Some(false);
            }
        }
        filled.enumerable = Some(filled.enumerable.unwrap_or(false));
        filled.configurable = Some(filled.configurable.unwrap_or(false));
        filled
    }
}

fn defined_same(requested: &Option<JsValue>, current: &Option<JsValue>) -> bool {
    match requested {
        None => true,
        Some(requested) => match current {
            Some(current) => requested.same_value(current),
            None => false,
        },
    }
}
