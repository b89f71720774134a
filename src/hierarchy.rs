use image::GrayImage;
use imageproc::contours::{find_contours, Contour};
use imageproc::point::Point;

/// One contour in a first-child / next-sibling encoded forest.
#[derive(Debug, Clone)]
pub struct ContourNode {
    pub points: Vec<Point<i32>>,
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
}

impl ContourNode {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points, first_child: None, next_sibling: None }
    }
}

/// Nesting relationships between extracted contours.
///
/// Nodes keep their discovery order and sibling chains are linked in that
/// order. The candidate search only ever borrows a forest; it is never
/// mutated after construction.
#[derive(Debug, Default)]
pub struct ContourForest {
    nodes: Vec<ContourNode>,
    first_root: Option<usize>,
}

impl ContourForest {
    /// Assemble a forest from already linked nodes.
    pub fn new(nodes: Vec<ContourNode>, first_root: Option<usize>) -> Self {
        Self { nodes, first_root }
    }

    /// Link contours carrying parent indices into child and sibling chains.
    pub fn from_contours(contours: Vec<Contour<i32>>) -> Self {
        let parents: Vec<Option<usize>> = contours.iter().map(|c| c.parent).collect();
        let mut nodes: Vec<ContourNode> =
            contours.into_iter().map(|c| ContourNode::new(c.points)).collect();

        let mut first_root = None;
        let mut last_root: Option<usize> = None;
        let mut last_child: Vec<Option<usize>> = vec![None; nodes.len()];
        for idx in 0..nodes.len() {
            match parents[idx] {
                Some(parent) => {
                    match last_child[parent] {
                        Some(prev) => nodes[prev].next_sibling = Some(idx),
                        None => nodes[parent].first_child = Some(idx),
                    }
                    last_child[parent] = Some(idx);
                }
                None => {
                    match last_root {
                        Some(prev) => nodes[prev].next_sibling = Some(idx),
                        None => first_root = Some(idx),
                    }
                    last_root = Some(idx);
                }
            }
        }
        Self { nodes, first_root }
    }

    /// Extract contours from a binary edge map and build the forest.
    pub fn from_edges(edges: &GrayImage) -> Self {
        Self::from_contours(find_contours::<i32>(edges))
    }

    pub fn node(&self, idx: usize) -> &ContourNode {
        &self.nodes[idx]
    }

    pub fn first_root(&self) -> Option<usize> {
        self.first_root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of direct children of `idx`.
    pub fn child_count(&self, idx: usize) -> usize {
        let mut count = 0;
        let mut child = self.nodes[idx].first_child;
        while let Some(c) = child {
            count += 1;
            child = self.nodes[c].next_sibling;
        }
        count
    }
}
