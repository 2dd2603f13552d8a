// src/topology/node.rs

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::coords::Coordinates;

/// Shared handle to a [`Node`] held by one or more elements.
pub type NodeRef<const D: usize, T> = Rc<RefCell<Node<D, T>>>;

/// A point in `D`-dimensional space plus the bookkeeping elements keep on it.
///
/// Equality compares the location together with `index` and
/// `shared_elements`, so two nodes at the same place are only equal when their
/// bookkeeping matches as well.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node<const D: usize, T> {
    location: T,
    index: usize,                   // Slot within the last element that indexed it
    shared_elements: i64,           // Number of elements currently holding the node
}

impl<const D: usize, T> Node<D, T> {
    /// Creates an untracked node at `location`.
    pub fn new(location: T) -> Self {
        Node { location, index: 0, shared_elements: 0 }
    }

    pub fn location(&self) -> &T {
        &self.location
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn shared_elements(&self) -> i64 {
        self.shared_elements
    }

    pub fn set_shared_elements(&mut self, shared_elements: i64) {
        self.shared_elements = shared_elements;
    }

    /// Spatial dimension of the node.
    pub const fn dimension(&self) -> usize {
        D
    }

    /// Moves the node behind a shared handle.
    pub fn into_ref(self) -> NodeRef<D, T> {
        Rc::new(RefCell::new(self))
    }
}

impl<const D: usize, T: Coordinates> fmt::Display for Node<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "location: (")?;
        for axis in 0..D {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.location.coordinate(axis))?;
        }
        write!(f, ") index: {} shared elements: {}", self.index, self.shared_elements)
    }
}
