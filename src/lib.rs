//! ECMAScript object model: property descriptors, the generic property
//! access protocol (section 8.12), prototype chains, array objects with the
//! length invariant (section 15.4.5.1), and stack-backed argument views.
//!
//! The crate is the object-layer seam of an engine: no parser, no
//! evaluator. A [`Context`] carries the interner, evaluation stack, and
//! shape registry; [`JsObject`] handles expose the protocol; native
//! callables re-enter it freely because no interior borrow is held across
//! an invocation.

pub mod arguments;
pub mod array;
pub mod context;
pub mod error;
pub mod object;
pub mod property;
pub mod symbol;
pub mod types;

pub use arguments::{Arguments, EvalStack};
pub use array::IndexedElements;
pub use context::{Context, Shape};
pub use error::{Error, ErrorKind};
pub use object::{EnumerationMode, Hint, JsFunction, JsObject, JsObjectData, NativeFunction};
pub use property::PropertyDescriptor;
pub use symbol::{Symbol, SymbolTable};
pub use types::{JsBigInt, JsString, JsValue};
