//! Recursive heap-footprint accounting.
//!
//! [`HeapSizeOf`] reports the dynamically-allocated bytes a value owns,
//! excluding the stack-resident portion of the value itself. Aggregate types
//! compose the estimate explicitly: their own variable-length buffers'
//! capacities plus the recursive footprint of each owned child. The estimate
//! is side-effect free and never allocates.
//!
//! Consumers use the total for memory budgeting, e.g. bounding a cache by
//! bytes rather than entry count.

use bytes::{Bytes, BytesMut};
use std::mem;

/// Heap footprint of a value's owned allocations.
pub trait HeapSizeOf {
    /// Bytes of heap memory owned by this value's descendants, excluding
    /// the value's own inline representation.
    fn heap_size_of_children(&self) -> usize;
}

macro_rules! no_heap {
    ($($t:ty)*) => {
        $(
            impl HeapSizeOf for $t {
                fn heap_size_of_children(&self) -> usize {
                    0
                }
            }
        )*
    };
}

no_heap! {
    ()
    u8 u16 u32 u64 u128 usize
    i8 i16 i32 i64 i128 isize
    f32 f64 bool char
}

impl<T: HeapSizeOf, const N: usize> HeapSizeOf for [T; N] {
    fn heap_size_of_children(&self) -> usize {
        self.iter().map(HeapSizeOf::heap_size_of_children).sum()
    }
}

impl<T: HeapSizeOf> HeapSizeOf for Box<T> {
    fn heap_size_of_children(&self) -> usize {
        // The boxed value itself lives on the heap, plus whatever it owns.
        mem::size_of::<T>() + (**self).heap_size_of_children()
    }
}

impl<T: HeapSizeOf> HeapSizeOf for Option<T> {
    fn heap_size_of_children(&self) -> usize {
        self.as_ref().map_or(0, HeapSizeOf::heap_size_of_children)
    }
}

impl<T: HeapSizeOf> HeapSizeOf for Vec<T> {
    fn heap_size_of_children(&self) -> usize {
        self.capacity() * mem::size_of::<T>() +
            self.iter().map(HeapSizeOf::heap_size_of_children).sum::<usize>()
    }
}

impl HeapSizeOf for String {
    fn heap_size_of_children(&self) -> usize {
        self.capacity()
    }
}

impl HeapSizeOf for BytesMut {
    fn heap_size_of_children(&self) -> usize {
        self.capacity()
    }
}

impl HeapSizeOf for Bytes {
    // Shared buffers are attributed by visible length; the allocation may
    // be shared with other handles.
    fn heap_size_of_children(&self) -> usize {
        self.len()
    }
}

macro_rules! tuple_heap_size {
    ($(($($name:ident : $idx:tt),+))+) => {
        $(
            impl<$($name: HeapSizeOf),+> HeapSizeOf for ($($name,)+) {
                fn heap_size_of_children(&self) -> usize {
                    0 $(+ self.$idx.heap_size_of_children())+
                }
            }
        )+
    };
}

tuple_heap_size! {
    (A: 0, B: 1)
    (A: 0, B: 1, C: 2)
    (A: 0, B: 1, C: 2, D: 3)
}
