//! Ambient state threaded through the protocol: the symbol interner, the
//! evaluation stack argument views live on, and the shape registry object
//! factories draw class identity and prototypes from.

use rustc_hash::FxHashMap;

use crate::arguments::EvalStack;
use crate::error::{Error, ErrorKind};
use crate::object::{Hint, JsObject, JsObjectData};
use crate::property::PropertyDescriptor;
use crate::symbol::{self, Symbol, SymbolTable};
use crate::types::{self, JsString, JsValue};

/// Class identity plus prototype, the two things every instance of a class
/// starts from.
#[derive(Clone)]
pub struct Shape {
    pub class_name: String,
    pub prototype: Option<JsObject>,
}

impl Shape {
    pub fn new(class_name: impl Into<String>, prototype: Option<JsObject>) -> Self {
        Self {
            class_name: class_name.into(),
            prototype,
        }
    }
}

pub struct Context {
    symbols: SymbolTable,
    stack: EvalStack,
    shapes: FxHashMap<String, Shape>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            stack: EvalStack::new(),
            shapes: FxHashMap::default(),
        }
    }

    pub fn with_stack_limit(limit: usize) -> Self {
        Self {
            stack: EvalStack::with_limit(limit),
            ..Self::new()
        }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.symbols.intern(s)
    }

    pub fn description(&self, sym: Symbol) -> String {
        self.symbols.description(sym)
    }

    pub fn stack(&self) -> &EvalStack {
        &self.stack
    }

    pub fn register_shape(&mut self, shape: Shape) {
        self.shapes.insert(shape.class_name.clone(), shape);
    }

    pub fn shape(&self, class_name: &str) -> Option<&Shape> {
        self.shapes.get(class_name)
    }

    /// Instance factory: a registered shape supplies the prototype, an
    /// unregistered class name yields a bare object of that class.
    pub fn new_object(&self, class_name: &str) -> JsObject {
        match self.shapes.get(class_name) {
            Some(shape) => JsObject::with_shape(shape),
            None => JsObject::from_data(JsObjectData::new(class_name)),
        }
    }

    // §7.1.4 ToNumber
    pub fn to_number(&mut self, value: &JsValue, e: &mut Error) -> f64 {
        match value {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            JsValue::Number(n) => *n,
            JsValue::String(s) => types::string_to_number(s),
            JsValue::BigInt(_) => {
                e.report(ErrorKind::Type, "cannot convert a BigInt to a number");
                f64::NAN
            }
            JsValue::Object(obj) => {
                let obj = obj.clone();
                let primitive = obj.default_value(self, Hint::Number, e);
                if e.occurred() {
                    return f64::NAN;
                }
                // default_value only ever hands back a primitive
                self.to_number(&primitive, e)
            }
        }
    }

    /// String wrapper: boxes the primitive and materializes the frozen
    /// `length` and per-code-unit index properties.
    pub fn new_string_object(&self, value: JsString) -> JsObject {
        let obj = self.new_object("String");
        {
            let mut data = obj.data_mut();
            data.primitive_value = Some(JsValue::String(value.clone()));
            data.insert(
                symbol::LENGTH,
                PropertyDescriptor::data(
                    JsValue::Number(value.len() as f64),
                    false,
                    false,
                    false,
                ),
            );
            for (index, unit) in value.code_units.iter().enumerate() {
                data.insert(
                    Symbol::Index(index as u32),
                    PropertyDescriptor::data(
                        JsValue::String(JsString {
                            code_units: vec![*unit],
                        }),
                        false,
                        true,
                        false,
                    ),
                );
            }
        }
        obj
    }

    pub fn new_number_object(&self, value: f64) -> JsObject {
        let obj = self.new_object("Number");
        obj.data_mut().primitive_value = Some(JsValue::Number(value));
        obj
    }

    pub fn new_boolean_object(&self, value: bool) -> JsObject {
        let obj = self.new_object("Boolean");
        obj.data_mut().primitive_value = Some(JsValue::Boolean(value));
        obj
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
