// src/topology/element.rs

use std::fmt;
use std::rc::Rc;

use log::trace;
use nalgebra::DMatrix;

use super::coords::Coordinates;
use super::node::{Node, NodeRef};
use crate::error::{PdeError, Result};
use crate::utils::factorial;

/// A topological unit of `N` nodes in `D`-dimensional space.
///
/// Elements hold shared stakes in their nodes. Every element that holds a
/// node adds one to its `shared_elements` count and removes it again when
/// dropped, so the count always equals the number of live elements using the
/// node. The node itself is released together with the last handle to it.
#[derive(Debug)]
pub struct Element<const D: usize, const N: usize, T> {
    nodes: [NodeRef<D, T>; N],
}

impl<const D: usize, const N: usize, T: Clone> Element<D, N, T> {
    /// Builds an element over the given nodes.
    ///
    /// A node that no element tracks yet (`shared_elements <= 0`) is copied
    /// into a private node owned by the new element. Tracked nodes are shared.
    ///
    /// # Arguments
    ///
    /// * `nodes` - Handles to the corner nodes, in slot order.
    pub fn new(nodes: &[NodeRef<D, T>; N]) -> Self {
        let element = Element {
            nodes: std::array::from_fn(|i| adopt(&nodes[i])),
        };
        element.increase_shared_elements();
        element
    }

    /// Builds an element from a runtime list of node handles.
    ///
    /// # Returns
    ///
    /// * `Ok(Element)` if `nodes` holds exactly `N` handles.
    /// * `Err(PdeError::NodeCount)` otherwise.
    pub fn from_slice(nodes: &[NodeRef<D, T>]) -> Result<Self> {
        let array: &[NodeRef<D, T>; N] = nodes.try_into().map_err(|_| PdeError::NodeCount {
            expected: N,
            found: nodes.len(),
        })?;
        Ok(Self::new(array))
    }

    /// Returns a copy of the node in slot `i`.
    pub fn node(&self, i: usize) -> Node<D, T> {
        self.nodes[i].borrow().clone()
    }

    /// Copies of all nodes in slot order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<D, T>> + '_ {
        self.nodes.iter().map(|node| node.borrow().clone())
    }
}

impl<const D: usize, const N: usize, T> Element<D, N, T> {
    /// Returns the handle stored in slot `i`, for building neighbouring
    /// elements over the same node.
    pub fn handle(&self, i: usize) -> NodeRef<D, T> {
        Rc::clone(&self.nodes[i])
    }

    /// Sets the index of every node to its slot in this element.
    ///
    /// Nodes are shared, so every other element holding them sees the change.
    pub fn set_indices(&self) {
        for (i, node) in self.nodes.iter().enumerate() {
            node.borrow_mut().set_index(i);
        }
    }

    fn increase_shared_elements(&self) {
        for node in &self.nodes {
            let mut node = node.borrow_mut();
            let shared_elements = node.shared_elements();
            node.set_shared_elements(shared_elements + 1);
        }
    }
}

impl<const D: usize, const N: usize, T: Coordinates> Element<D, N, T> {
    /// Edge matrix of the simplex.
    ///
    /// Entry `(row, col)` holds `nodes[row + 1][col] - nodes[row][col]`. For an
    /// element that is not a simplex (`N != D + 1`) the zero matrix is returned.
    pub fn simplex_matrix(&self) -> DMatrix<f64> {
        if N != D + 1 {
            return DMatrix::zeros(D, D);
        }
        DMatrix::from_fn(D, D, |row, col| {
            let next = self.nodes[row + 1].borrow();
            let current = self.nodes[row].borrow();
            next.location().coordinate(col) - current.location().coordinate(col)
        })
    }

    /// Determinant of the simplex matrix: the signed volume of the
    /// parallelotope spanned by the simplex edges.
    pub fn parallelotope_volume(&self) -> f64 {
        self.simplex_matrix().determinant()
    }

    /// Signed volume of the simplex, `det / D!`.
    ///
    /// The sign follows the node ordering. Non-simplex elements report 0.
    pub fn volume(&self) -> f64 {
        self.parallelotope_volume() / factorial(D) as f64
    }
}

fn adopt<const D: usize, T: Clone>(node: &NodeRef<D, T>) -> NodeRef<D, T> {
    let borrowed = node.borrow();
    if borrowed.shared_elements() <= 0 {
        borrowed.clone().into_ref()
    } else {
        Rc::clone(node)
    }
}

impl<const D: usize, const N: usize, T: Clone + Default> Default for Element<D, N, T> {
    fn default() -> Self {
        let element = Element {
            nodes: std::array::from_fn(|_| Node::default().into_ref()),
        };
        element.increase_shared_elements();
        element
    }
}

impl<const D: usize, const N: usize, T> Clone for Element<D, N, T> {
    fn clone(&self) -> Self {
        let element = Element { nodes: self.nodes.clone() };
        element.increase_shared_elements();
        element
    }
}

impl<const D: usize, const N: usize, T> Drop for Element<D, N, T> {
    fn drop(&mut self) {
        for node in &self.nodes {
            let mut node = node.borrow_mut();
            let remaining = node.shared_elements() - 1;
            node.set_shared_elements(remaining);
            if remaining <= 0 {
                trace!("releasing node held by no element");
            }
        }
        trace!("element dropped");
    }
}

impl<const D: usize, const N: usize, T: PartialEq> PartialEq for Element<D, N, T> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes
            .iter()
            .zip(other.nodes.iter())
            .all(|(a, b)| *a.borrow() == *b.borrow())
    }
}

impl<const D: usize, const N: usize, T: Coordinates> fmt::Display for Element<D, N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#nodes: {}", N)?;
        for node in &self.nodes {
            writeln!(f, "{}", node.borrow())?;
        }
        Ok(())
    }
}
