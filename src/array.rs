//! Array specialization: the length invariant (section 15.4.5.1) over
//! adaptive element storage.
//!
//! While an array is "dense", every element carries the default
//! writable/enumerable/configurable attributes: small indices live in a
//! vector, indices past the vector threshold in an overflow map. Defining
//! an accessor or any non-default attribute on an index deoptimizes the
//! array: all elements move into the ordinary property table under their
//! index symbols, and length changes take the per-index delete path.

use rustc_hash::FxHashMap;

use crate::context::{Context, Shape};
use crate::error::{Error, ErrorKind, reject};
use crate::object::{EnumerationMode, JsObject, JsObjectData};
use crate::property::PropertyDescriptor;
use crate::symbol::Symbol;
use crate::types::{JsValue, number_ops};

/// Dense/sparse boundary. Tunable; not load-bearing for correctness.
pub(crate) const MAX_VECTOR_SIZE: u32 = 1 << 16;

/// Below this distance a shrink just walks the index range; above it the
/// cost is bounded by occupancy instead.
const SMALL_SHRINK_LIMIT: u32 = 1 << 24;

pub struct IndexedElements {
    pub(crate) vector: Vec<Option<JsValue>>,
    pub(crate) map: Option<FxHashMap<u32, PropertyDescriptor>>,
    length: u32,
    writable: bool,
    dense: bool,
}

impl IndexedElements {
    pub(crate) fn new(length: u32) -> Self {
        Self {
            vector: Vec::new(),
            map: None,
            length,
            writable: true,
            dense: true,
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub(crate) fn set_length(&mut self, length: u32) {
        self.length = length;
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn make_read_only(&mut self) {
        self.writable = false;
    }

    pub fn is_dense(&self) -> bool {
        self.dense
    }

    fn ensure_map(&mut self) -> &mut FxHashMap<u32, PropertyDescriptor> {
        self.map.get_or_insert_with(FxHashMap::default)
    }

    fn drop_map(&mut self) {
        self.map = None;
    }

    pub(crate) fn own(&self, index: u32) -> Option<PropertyDescriptor> {
        if index < MAX_VECTOR_SIZE {
            let slot = self.vector.get(index as usize)?.clone()?;
            return Some(PropertyDescriptor::data(slot, true, true, true));
        }
        self.map.as_ref()?.get(&index).cloned()
    }

    pub(crate) fn own_indices(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self
            .vector
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index as u32))
            .collect();
        if let Some(map) = &self.map {
            indices.extend(map.keys().copied());
        }
        indices
    }
}

impl JsObject {
    pub fn new_array(length: u32) -> JsObject {
        let mut data = JsObjectData::new("Array");
        data.elements = Some(IndexedElements::new(length));
        JsObject::from_data(data)
    }

    pub fn new_array_with_shape(shape: &Shape, length: u32) -> JsObject {
        let array = JsObject::with_shape(shape);
        array.data_mut().elements = Some(IndexedElements::new(length));
        array
    }

    /// Array with storage pre-sized for `length` elements, for callers
    /// about to bulk-fill a literal.
    pub fn reserved_array(length: u32) -> JsObject {
        let array = JsObject::new_array(length);
        {
            let mut data = array.data_mut();
            if let Some(elements) = data.elements.as_mut() {
                if length > MAX_VECTOR_SIZE {
                    elements.vector.resize(MAX_VECTOR_SIZE as usize, None);
                    elements.ensure_map();
                } else {
                    elements.vector.resize(length as usize, None);
                }
            }
        }
        array
    }

    pub fn array_length(&self) -> u32 {
        self.data()
            .elements
            .as_ref()
            .map_or(0, |elements| elements.length())
    }

    /// Writes a contiguous run straight into dense storage, bypassing the
    /// per-index define path. The caller pre-validates the range.
    pub fn set_to_vector(&self, index: u32, values: &[JsValue]) {
        debug_assert!(index as usize + values.len() <= MAX_VECTOR_SIZE as usize);
        let mut data = self.data_mut();
        let Some(elements) = data.elements.as_mut() else {
            return;
        };
        debug_assert!(elements.vector.len() >= index as usize + values.len());
        for (offset, value) in values.iter().enumerate() {
            elements.vector[index as usize + offset] = Some(value.clone());
        }
    }

    /// Sparse counterpart of `set_to_vector` for indices past the vector
    /// threshold.
    pub fn set_to_map(&self, index: u32, values: &[JsValue]) {
        debug_assert!(index >= MAX_VECTOR_SIZE);
        let mut data = self.data_mut();
        let Some(elements) = data.elements.as_mut() else {
            return;
        };
        let map = elements.ensure_map();
        for (offset, value) in values.iter().enumerate() {
            map.insert(
                index + offset as u32,
                PropertyDescriptor::data_default(value.clone()),
            );
        }
    }
}

pub(crate) fn change_length_writable(
    array: &JsObject,
    writable: bool,
    throwable: bool,
    e: &mut Error,
) -> bool {
    let mut data = array.data_mut();
    let Some(elements) = data.elements.as_mut() else {
        return true;
    };
    if !writable {
        elements.make_read_only();
    } else if !elements.writable() {
        return reject(
            throwable,
            e,
            "changing [[Writable]] of unconfigurable property not allowed",
        );
    }
    true
}

// section 15.4.5.1 step 3
pub(crate) fn define_length_property(
    array: &JsObject,
    ctx: &mut Context,
    desc: &PropertyDescriptor,
    throwable: bool,
    e: &mut Error,
) -> bool {
    if desc.configurable == Some(true) {
        return reject(
            throwable,
            e,
            "changing [[Configurable]] of unconfigurable property not allowed",
        );
    }
    if desc.enumerable == Some(true) {
        return reject(
            throwable,
            e,
            "changing [[Enumerable]] of unconfigurable property not allowed",
        );
    }
    if desc.is_accessor_descriptor() {
        return reject(
            throwable,
            e,
            "changing descriptor type of unconfigurable property not allowed",
        );
    }

    let Some(value) = desc.value.clone() else {
        if let Some(writable) = desc.writable {
            return change_length_writable(array, writable, throwable, e);
        }
        return true;
    };

    // length must be a uint32; conversion may re-enter through valueOf
    let number = ctx.to_number(&value, e);
    if e.occurred() {
        return false;
    }
    let new_len = number_ops::to_uint32(number);
    if new_len as f64 != number {
        // range error occurs even if throwable is false
        e.report(ErrorKind::Range, "invalid array length");
        return false;
    }

    let Some((old_len, length_writable)) = array
        .data()
        .elements
        .as_ref()
        .map(|elements| (elements.length(), elements.writable()))
    else {
        return true;
    };

    if new_len == old_len {
        // no change; passes even when length is read-only
        if let Some(writable) = desc.writable {
            return change_length_writable(array, writable, throwable, e);
        }
        return true;
    }

    if !length_writable {
        return reject(throwable, e, "\"length\" not writable");
    }

    // the writable change still applies after a failed shrink, but the
    // overall result is the shrink's; length is known writable here, so
    // only the transition to read-only is observable
    let succeeded = set_length(array, new_len, throwable, e);
    if desc.writable == Some(false)
        && let Some(elements) = array.data_mut().elements.as_mut()
    {
        elements.make_read_only();
    }
    succeeded
}

pub(crate) fn set_length(array: &JsObject, len: u32, throwable: bool, e: &mut Error) -> bool {
    {
        let mut data = array.data_mut();
        let Some(elements) = data.elements.as_mut() else {
            return true;
        };
        let old = elements.length();
        if len >= old {
            // growing never materializes elements
            elements.set_length(len);
            return true;
        }
        if elements.is_dense() {
            if len > MAX_VECTOR_SIZE {
                if let Some(map) = elements.map.as_mut() {
                    let mut indices: Vec<u32> = map.keys().copied().collect();
                    indices.sort_unstable_by(|a, b| b.cmp(a));
                    for index in indices {
                        if index >= len {
                            map.remove(&index);
                        } else {
                            break;
                        }
                    }
                    if map.is_empty() {
                        elements.drop_map();
                    }
                }
            } else {
                elements.drop_map();
                if elements.vector.len() > len as usize {
                    elements.vector.truncate(len as usize);
                }
            }
            elements.set_length(len);
            return true;
        }
    }
    generic_shrink(array, len, throwable, e)
}

/// Shrink over table-resident elements. Descending deletes; on the first
/// non-configurable element the length snaps to that index + 1.
fn generic_shrink(array: &JsObject, len: u32, throwable: bool, e: &mut Error) -> bool {
    let mut old = array.array_length();
    if old - len < SMALL_SHRINK_LIMIT {
        while len < old {
            old -= 1;
            if !array.delete(Symbol::Index(old), false, e) {
                set_stored_length(array, old + 1);
                if throwable {
                    e.report(ErrorKind::Type, "shrink array failed");
                }
                return false;
            }
        }
        set_stored_length(array, len);
        return true;
    }

    // big shrink: bounded by occupancy, not by the numeric range
    let mut names = Vec::new();
    array.get_own_property_names(&mut names, EnumerationMode::IncludeNotEnumerable);
    let mut indices: Vec<u32> = names
        .into_iter()
        .filter_map(|name| name.array_index())
        .collect();
    indices.sort_unstable();
    for index in indices.into_iter().rev() {
        if index < len {
            break;
        }
        if !array.delete(Symbol::Index(index), false, e) {
            set_stored_length(array, index + 1);
            if throwable {
                e.report(ErrorKind::Type, "shrink array failed");
            }
            return false;
        }
    }
    set_stored_length(array, len);
    true
}

fn set_stored_length(array: &JsObject, len: u32) {
    if let Some(elements) = array.data_mut().elements.as_mut() {
        elements.set_length(len);
    }
}

// section 15.4.5.1 step 4
pub(crate) fn define_indexed_property(
    array: &JsObject,
    index: u32,
    desc: &PropertyDescriptor,
    throwable: bool,
    e: &mut Error,
) -> bool {
    let Some((old_len, length_writable, dense)) =
        array.data().elements.as_ref().map(|elements| {
            (
                elements.length(),
                elements.writable(),
                elements.is_dense(),
            )
        })
    else {
        return true;
    };

    if index >= old_len && !length_writable {
        return reject(
            throwable,
            e,
            "adding an element to an array whose length is not writable",
        );
    }

    let exists = dense
        && array
            .data()
            .elements
            .as_ref()
            .is_some_and(|elements| elements.own(index).is_some());
    let plain = if exists {
        plain_update(desc)
    } else {
        plain_create(desc)
    };

    let succeeded = if dense && plain {
        define_plain_element(array, index, desc, throwable, e)
    } else {
        if dense {
            deoptimize(array);
        }
        array.define_own_generic(Symbol::Index(index), desc, throwable, e)
    };
    if !succeeded {
        return false;
    }
    if index >= old_len {
        set_stored_length(array, index + 1);
    }
    true
}

/// Updating a dense element keeps its default-true attributes, so any
/// absent attribute is fine; only an explicit false forces the slow path.
fn plain_update(desc: &PropertyDescriptor) -> bool {
    !desc.is_accessor_descriptor()
        && desc.writable != Some(false)
        && desc.enumerable != Some(false)
        && desc.configurable != Some(false)
}

/// Creating through the generic algorithm defaults absent attributes to
/// false, so dense storage is only correct when all three are explicitly
/// true (as Put supplies them).
fn plain_create(desc: &PropertyDescriptor) -> bool {
    !desc.is_accessor_descriptor()
        && desc.writable == Some(true)
        && desc.enumerable == Some(true)
        && desc.configurable == Some(true)
}

fn define_plain_element(
    array: &JsObject,
    index: u32,
    desc: &PropertyDescriptor,
    throwable: bool,
    e: &mut Error,
) -> bool {
    let mut data = array.data_mut();
    let extensible = data.extensible;
    let Some(elements) = data.elements.as_mut() else {
        return true;
    };
    if index < MAX_VECTOR_SIZE {
        let current = elements.vector.get(index as usize).cloned().flatten();
        if current.is_none() && !extensible {
            return reject(throwable, e, "object not extensible");
        }
        let value = desc.value.clone().or(current).unwrap_or(JsValue::Undefined);
        if elements.vector.len() <= index as usize {
            elements.vector.resize(index as usize + 1, None);
        }
        elements.vector[index as usize] = Some(value);
        return true;
    }

    let current = elements
        .map
        .as_ref()
        .and_then(|map| map.get(&index))
        .and_then(|desc| desc.value.clone());
    if current.is_none() && !extensible {
        return reject(throwable, e, "object not extensible");
    }
    let value = desc.value.clone().or(current).unwrap_or(JsValue::Undefined);
    elements
        .ensure_map()
        .insert(index, PropertyDescriptor::data_default(value));
    true
}

pub(crate) fn delete_dense_element(array: &JsObject, index: u32) -> bool {
    let mut data = array.data_mut();
    let Some(elements) = data.elements.as_mut() else {
        return true;
    };
    if index < MAX_VECTOR_SIZE {
        if let Some(slot) = elements.vector.get_mut(index as usize) {
            *slot = None;
        }
    } else if let Some(map) = elements.map.as_mut() {
        map.remove(&index);
        if map.is_empty() {
            elements.drop_map();
        }
    }
    true
}

/// Moves every element into the property table under its index symbol.
/// From here on the array answers index operations through the generic
/// protocol and shrinks element by element.
fn deoptimize(array: &JsObject) {
    let mut data = array.data_mut();
    let Some(elements) = data.elements.as_mut() else {
        return;
    };
    if !elements.is_dense() {
        return;
    }
    elements.dense = false;
    let vector = std::mem::take(&mut elements.vector);
    let map = elements.map.take();

    for (index, slot) in vector.into_iter().enumerate() {
        if let Some(value) = slot {
            data.insert(
                Symbol::Index(index as u32),
                PropertyDescriptor::data_default(value),
            );
        }
    }
    if let Some(map) = map {
        let mut entries: Vec<(u32, PropertyDescriptor)> = map.into_iter().collect();
        entries.sort_unstable_by_key(|(index, _)| *index);
        for (index, desc) in entries {
            data.insert(Symbol::Index(index), desc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol;

    fn filled_array(ctx: &mut Context, len: u32) -> JsObject {
        let array = JsObject::new_array(0);
        let mut e = Error::new();
        for index in 0..len {
            assert!(array.put(
                ctx,
                Symbol::Index(index),
                JsValue::Number(index as f64),
                true,
                &mut e,
            ));
        }
        assert_eq!(array.array_length(), len);
        array
    }

    fn set_length_via_define(
        ctx: &mut Context,
        array: &JsObject,
        len: f64,
        throwable: bool,
    ) -> (bool, Error) {
        let mut e = Error::new();
        let ok = array.define_own_property(
            ctx,
            symbol::LENGTH,
            &PropertyDescriptor::value_only(JsValue::Number(len)),
            throwable,
            &mut e,
        );
        (ok, e)
    }

    #[test]
    fn length_reads_as_unconfigurable_data_property() {
        let array = JsObject::new_array(4);
        let desc = array.get_own_property(symbol::LENGTH).unwrap();
        assert!(desc.value.unwrap().same_value(&JsValue::Number(4.0)));
        assert_eq!(desc.writable, Some(true));
        assert_eq!(desc.enumerable, Some(false));
        assert_eq!(desc.configurable, Some(false));
    }

    #[test]
    fn dense_shrink_truncates_elements() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 10);
        let (ok, e) = set_length_via_define(&mut ctx, &array, 3.0, true);
        assert!(ok);
        assert!(!e.occurred());
        assert_eq!(array.array_length(), 3);
        for index in 3..10 {
            assert!(array.get_own_property(Symbol::Index(index)).is_none());
        }
        assert!(
            array
                .get_own_property(Symbol::Index(2))
                .unwrap()
                .value
                .unwrap()
                .same_value(&JsValue::Number(2.0))
        );
    }

    #[test]
    fn growing_never_materializes_elements() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let (ok, _) = set_length_via_define(&mut ctx, &array, 1_000_000.0, true);
        assert!(ok);
        assert_eq!(array.array_length(), 1_000_000);
        assert_eq!(array.data().elements.as_ref().unwrap().vector.len(), 3);
        assert!(array.get_own_property(Symbol::Index(500)).is_none());
        let mut e = Error::new();
        assert!(
            array
                .get(&mut ctx, Symbol::Index(500), &mut e)
                .is_undefined()
        );
    }

    #[test]
    fn shrink_stops_at_nonconfigurable_element() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 10);
        let mut e = Error::new();
        // locking an element's attributes deoptimizes the storage
        assert!(array.define_own_property(
            &mut ctx,
            Symbol::Index(5),
            &PropertyDescriptor {
                configurable: Some(false),
                ..Default::default()
            },
            true,
            &mut e,
        ));
        assert!(!array.data().elements.as_ref().unwrap().is_dense());

        let (ok, e) = set_length_via_define(&mut ctx, &array, 0.0, true);
        assert!(!ok);
        assert_eq!(e.kind(), Some(ErrorKind::Type));
        // length reflects the highest surviving index + 1
        assert_eq!(array.array_length(), 6);
        assert!(array.get_own_property(Symbol::Index(5)).is_some());
        assert!(array.get_own_property(Symbol::Index(6)).is_none());
    }

    #[test]
    fn shrink_failure_is_silent_without_throwable() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 4);
        let mut e = Error::new();
        array.define_own_property(
            &mut ctx,
            Symbol::Index(1),
            &PropertyDescriptor {
                configurable: Some(false),
                ..Default::default()
            },
            true,
            &mut e,
        );
        let (ok, e) = set_length_via_define(&mut ctx, &array, 0.0, false);
        assert!(!ok);
        assert!(!e.occurred());
        assert_eq!(array.array_length(), 2);
    }

    #[test]
    fn failed_shrink_still_applies_writable_change() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 4);
        let mut e = Error::new();
        array.define_own_property(
            &mut ctx,
            Symbol::Index(1),
            &PropertyDescriptor {
                configurable: Some(false),
                ..Default::default()
            },
            true,
            &mut e,
        );

        // shrink fails at index 1, yet length still goes read-only
        let desc = PropertyDescriptor {
            value: Some(JsValue::Number(0.0)),
            writable: Some(false),
            ..Default::default()
        };
        let mut e2 = Error::new();
        assert!(!array.define_own_property(&mut ctx, symbol::LENGTH, &desc, true, &mut e2));
        assert_eq!(e2.kind(), Some(ErrorKind::Type));
        assert_eq!(array.array_length(), 2);
        assert!(!array.get_own_property(symbol::LENGTH).unwrap().writable.unwrap());
    }

    #[test]
    fn invalid_length_reports_range_even_when_not_throwable() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 2);
        for bad in [1.5, -1.0, f64::NAN, 4294967296.0] {
            let (ok, e) = set_length_via_define(&mut ctx, &array, bad, false);
            assert!(!ok, "length {bad} should fail");
            assert_eq!(e.kind(), Some(ErrorKind::Range));
            assert_eq!(array.array_length(), 2);
        }
    }

    #[test]
    fn length_value_converts_through_valueof() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 10);
        let boxed = JsObject::new_plain();
        let value_of = JsObject::new_native_function("valueOf", 0, |_, _, _| JsValue::Number(5.0));
        let mut e = Error::new();
        boxed.put(
            &mut ctx,
            symbol::VALUE_OF,
            JsValue::Object(value_of),
            true,
            &mut e,
        );
        assert!(array.define_own_property(
            &mut ctx,
            symbol::LENGTH,
            &PropertyDescriptor::value_only(JsValue::Object(boxed)),
            true,
            &mut e,
        ));
        assert_eq!(array.array_length(), 5);
    }

    #[test]
    fn length_define_rejects_attribute_changes() {
        let mut ctx = Context::new();
        let array = JsObject::new_array(1);
        let mut e = Error::new();
        for desc in [
            PropertyDescriptor {
                configurable: Some(true),
                ..Default::default()
            },
            PropertyDescriptor {
                enumerable: Some(true),
                ..Default::default()
            },
            PropertyDescriptor::accessor(
                Some(JsValue::Object(JsObject::new_native_function(
                    "length",
                    0,
                    |_, _, _| JsValue::Number(0.0),
                ))),
                None,
                false,
                false,
            ),
        ] {
            e.clear();
            assert!(!array.define_own_property(&mut ctx, symbol::LENGTH, &desc, true, &mut e));
            assert_eq!(e.kind(), Some(ErrorKind::Type));
        }
    }

    #[test]
    fn read_only_length_blocks_shrink_and_append() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let mut e = Error::new();
        assert!(array.define_own_property(
            &mut ctx,
            symbol::LENGTH,
            &PropertyDescriptor {
                writable: Some(false),
                ..Default::default()
            },
            true,
            &mut e,
        ));
        assert!(!array.get_own_property(symbol::LENGTH).unwrap().writable.unwrap());

        // shrinking is now a Type failure
        let (ok, e2) = set_length_via_define(&mut ctx, &array, 1.0, true);
        assert!(!ok);
        assert_eq!(e2.kind(), Some(ErrorKind::Type));
        assert_eq!(array.array_length(), 3);

        // appending past the end is rejected
        assert!(!array.put(&mut ctx, Symbol::Index(3), JsValue::Number(3.0), false, &mut e));
        assert_eq!(array.array_length(), 3);

        // writes inside the current bounds still work
        assert!(array.put(&mut ctx, Symbol::Index(0), JsValue::Number(9.0), true, &mut e));

        // once read-only, length writability cannot be restored
        e.clear();
        assert!(!array.define_own_property(
            &mut ctx,
            symbol::LENGTH,
            &PropertyDescriptor {
                writable: Some(true),
                ..Default::default()
            },
            true,
            &mut e,
        ));
        assert_eq!(e.kind(), Some(ErrorKind::Type));
    }

    #[test]
    fn equal_length_passes_even_when_read_only() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let mut e = Error::new();
        array.define_own_property(
            &mut ctx,
            symbol::LENGTH,
            &PropertyDescriptor {
                writable: Some(false),
                ..Default::default()
            },
            true,
            &mut e,
        );
        let (ok, e2) = set_length_via_define(&mut ctx, &array, 3.0, true);
        assert!(ok);
        assert!(!e2.occurred());
    }

    #[test]
    fn sparse_indices_use_the_overflow_map() {
        let mut ctx = Context::new();
        let array = JsObject::new_array(0);
        let far = MAX_VECTOR_SIZE + 10;
        let mut e = Error::new();
        assert!(array.put(&mut ctx, Symbol::Index(far), JsValue::Number(1.0), true, &mut e));
        assert_eq!(array.array_length(), far + 1);
        {
            let data = array.data();
            let elements = data.elements.as_ref().unwrap();
            assert!(elements.vector.is_empty());
            assert!(elements.map.as_ref().unwrap().contains_key(&far));
        }
        assert!(array.get_own_property(Symbol::Index(far)).is_some());
    }

    #[test]
    fn shrink_above_threshold_prunes_map_and_collapses() {
        let mut ctx = Context::new();
        let array = JsObject::new_array(0);
        let far = MAX_VECTOR_SIZE + 10;
        let near = MAX_VECTOR_SIZE + 2;
        let mut e = Error::new();
        array.put(&mut ctx, Symbol::Index(far), JsValue::Number(1.0), true, &mut e);
        array.put(&mut ctx, Symbol::Index(near), JsValue::Number(2.0), true, &mut e);

        // prune only the entries at or past the new length
        let keep = MAX_VECTOR_SIZE + 5;
        let (ok, _) = set_length_via_define(&mut ctx, &array, keep as f64, true);
        assert!(ok);
        assert_eq!(array.array_length(), keep);
        assert!(array.get_own_property(Symbol::Index(far)).is_none());
        assert!(array.get_own_property(Symbol::Index(near)).is_some());

        // removing the last sparse entry collapses back to pure dense
        let (ok, _) = set_length_via_define(&mut ctx, &array, MAX_VECTOR_SIZE as f64, true);
        assert!(ok);
        assert!(array.data().elements.as_ref().unwrap().map.is_none());
    }

    #[test]
    fn delete_leaves_a_hole_without_touching_length() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 5);
        let mut e = Error::new();
        assert!(array.delete(Symbol::Index(2), true, &mut e));
        assert!(array.get_own_property(Symbol::Index(2)).is_none());
        assert_eq!(array.array_length(), 5);
        assert!(array.get(&mut ctx, Symbol::Index(2), &mut e).is_undefined());
    }

    #[test]
    fn delete_length_is_rejected() {
        let array = JsObject::new_array(2);
        let mut e = Error::new();
        assert!(!array.delete(symbol::LENGTH, false, &mut e));
        assert!(!e.occurred());
        assert!(!array.delete(symbol::LENGTH, true, &mut e));
        assert_eq!(e.kind(), Some(ErrorKind::Type));
    }

    #[test]
    fn define_without_explicit_attributes_defaults_to_locked() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let mut e = Error::new();
        // generic defines default absent attributes to false, which dense
        // storage cannot represent
        assert!(array.define_own_property(
            &mut ctx,
            Symbol::Index(7),
            &PropertyDescriptor::value_only(JsValue::Number(7.0)),
            true,
            &mut e,
        ));
        assert_eq!(array.array_length(), 8);
        assert!(!array.data().elements.as_ref().unwrap().is_dense());
        let stored = array.get_own_property(Symbol::Index(7)).unwrap();
        assert_eq!(stored.writable, Some(false));
        assert_eq!(stored.enumerable, Some(false));
        assert_eq!(stored.configurable, Some(false));
        // the migrated elements kept their default attributes
        let migrated = array.get_own_property(Symbol::Index(1)).unwrap();
        assert_eq!(migrated.configurable, Some(true));
    }

    #[test]
    fn value_update_keeps_storage_dense() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let mut e = Error::new();
        assert!(array.define_own_property(
            &mut ctx,
            Symbol::Index(1),
            &PropertyDescriptor::value_only(JsValue::Number(42.0)),
            true,
            &mut e,
        ));
        assert!(array.data().elements.as_ref().unwrap().is_dense());
        assert!(
            array
                .get(&mut ctx, Symbol::Index(1), &mut e)
                .same_value(&JsValue::Number(42.0))
        );
    }

    #[test]
    fn accessor_element_deoptimizes_and_dispatches() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let getter = JsObject::new_native_function("get 0", 0, |_, _, _| JsValue::Number(77.0));
        let mut e = Error::new();
        assert!(array.define_own_property(
            &mut ctx,
            Symbol::Index(0),
            &PropertyDescriptor::accessor(Some(JsValue::Object(getter)), None, true, true),
            true,
            &mut e,
        ));
        assert!(!array.data().elements.as_ref().unwrap().is_dense());
        assert!(
            array
                .get(&mut ctx, Symbol::Index(0), &mut e)
                .same_value(&JsValue::Number(77.0))
        );
    }

    #[test]
    fn non_extensible_array_rejects_new_elements() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 2);
        array.set_extensible(false);
        let mut e = Error::new();
        assert!(!array.put(&mut ctx, Symbol::Index(5), JsValue::Number(5.0), true, &mut e));
        assert_eq!(e.kind(), Some(ErrorKind::Type));
        assert_eq!(array.array_length(), 2);
        // existing elements stay writable
        e.clear();
        assert!(array.put(&mut ctx, Symbol::Index(0), JsValue::Number(9.0), true, &mut e));
    }

    #[test]
    fn shaped_array_inherits_through_its_prototype() {
        let mut ctx = Context::new();
        let proto = JsObject::new_plain();
        let join = ctx.intern("join");
        let mut e = Error::new();
        proto.put(&mut ctx, join, JsValue::Boolean(true), true, &mut e);
        ctx.register_shape(Shape::new("Array", Some(proto.clone())));

        let array = JsObject::new_array_with_shape(ctx.shape("Array").unwrap(), 2);
        assert!(array.is_array());
        assert_eq!(array.array_length(), 2);
        assert!(array.prototype().unwrap().ptr_eq(&proto));
        assert!(
            array
                .get(&mut ctx, join, &mut e)
                .same_value(&JsValue::Boolean(true))
        );
    }

    #[test]
    fn bulk_fill_into_vector() {
        let mut ctx = Context::new();
        let array = JsObject::reserved_array(4);
        array.set_to_vector(
            0,
            &[
                JsValue::Number(0.0),
                JsValue::Number(1.0),
                JsValue::Number(2.0),
            ],
        );
        let mut e = Error::new();
        assert!(
            array
                .get(&mut ctx, Symbol::Index(2), &mut e)
                .same_value(&JsValue::Number(2.0))
        );
        // untouched reserved slots stay holes
        assert!(array.get_own_property(Symbol::Index(3)).is_none());
        assert_eq!(array.array_length(), 4);
    }

    #[test]
    fn bulk_fill_into_map() {
        let len = MAX_VECTOR_SIZE + 4;
        let array = JsObject::reserved_array(len);
        array.set_to_map(
            MAX_VECTOR_SIZE,
            &[JsValue::Number(1.0), JsValue::Number(2.0)],
        );
        assert!(
            array
                .get_own_property(Symbol::Index(MAX_VECTOR_SIZE + 1))
                .unwrap()
                .value
                .unwrap()
                .same_value(&JsValue::Number(2.0))
        );
        assert!(
            array
                .get_own_property(Symbol::Index(MAX_VECTOR_SIZE + 2))
                .is_none()
        );
    }

    #[test]
    fn enumeration_orders_indices_before_names() {
        let mut ctx = Context::new();
        let array = filled_array(&mut ctx, 3);
        let tag = ctx.intern("tag");
        let mut e = Error::new();
        array.put(&mut ctx, tag, JsValue::Boolean(true), true, &mut e);

        let mut names = Vec::new();
        array.get_own_property_names(&mut names, EnumerationMode::ExcludeNotEnumerable);
        assert_eq!(
            names,
            vec![
                Symbol::Index(0),
                Symbol::Index(1),
                Symbol::Index(2),
                tag
            ]
        );

        let mut all = Vec::new();
        array.get_own_property_names(&mut all, EnumerationMode::IncludeNotEnumerable);
        assert_eq!(
            all,
            vec![
                Symbol::Index(0),
                Symbol::Index(1),
                Symbol::Index(2),
                symbol::LENGTH,
                tag
            ]
        );
    }
}
