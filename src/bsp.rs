use crate::plane::Plane;
use crate::polygon::Polygon;
use crate::splitter::Splitter;

/// A BSP tree node, containing polygons coplanar with its plane plus
/// optional front/back subtrees.
///
/// Every polygon stored at a node lies on the node's plane within EPSILON;
/// polygons reachable through `front` are strictly in front of it, polygons
/// through `back` strictly behind.
#[derive(Debug, Clone)]
pub struct Node<S: Clone> {
    pub plane: Option<Plane>,
    pub front: Option<Box<Node<S>>>,
    pub back: Option<Box<Node<S>>>,
    pub polygons: Vec<Polygon<S>>,
}

impl<S: Clone + Send + Sync> Node<S> {
    pub fn new(polygons: &[Polygon<S>]) -> Self {
        let mut node = Node {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        };
        if !polygons.is_empty() {
            node.build(polygons);
        }
        node
    }

    /// Convert the solid to its complement: flip every polygon and plane and
    /// swap the front/back subtrees.
    pub fn invert(&mut self) {
        for p in &mut self.polygons {
            p.flip();
        }
        if let Some(ref mut plane) = self.plane {
            plane.flip();
        }
        if let Some(ref mut front) = self.front {
            front.invert();
        }
        if let Some(ref mut back) = self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove from `polygons` everything inside this BSP tree's solid,
    /// returning the parts that lie outside.
    pub fn clip_polygons(&self, polygons: &[Polygon<S>]) -> Vec<Polygon<S>> {
        // A node with no plane doesn't clip anything.
        let Some(ref plane) = self.plane else {
            return polygons.to_vec();
        };

        let splitter = Splitter::for_polygon_count(polygons.len());
        let (coplanar_front, coplanar_back, mut front, mut back) =
            splitter.split(plane, polygons);
        front.extend(coplanar_front);
        back.extend(coplanar_back);

        if let Some(ref f) = self.front {
            front = f.clip_polygons(&front);
        }
        if let Some(ref b) = self.back {
            back = b.clip_polygons(&back);
        } else {
            // Behind a leaf plane means inside the solid.
            back.clear();
        }

        front.extend(back);
        front
    }

    /// Remove all polygons in this BSP tree that are inside the other BSP
    /// tree's solid.
    pub fn clip_to(&mut self, bsp: &Node<S>) {
        self.polygons = bsp.clip_polygons(&self.polygons);
        if let Some(ref mut front) = self.front {
            front.clip_to(bsp);
        }
        if let Some(ref mut back) = self.back {
            back.clip_to(bsp);
        }
    }

    /// Return all polygons in this BSP tree, preorder.
    pub fn all_polygons(&self) -> Vec<Polygon<S>> {
        let mut result = self.polygons.clone();
        if let Some(ref front) = self.front {
            result.extend(front.all_polygons());
        }
        if let Some(ref back) = self.back {
            result.extend(back.all_polygons());
        }
        result
    }

    /// Extend the tree with additional polygons. May be called repeatedly;
    /// an empty list leaves the tree untouched.
    pub fn build(&mut self, polygons: &[Polygon<S>]) {
        if polygons.is_empty() {
            return;
        }

        // Choose the first polygon's plane as the splitting plane if not
        // already set.
        if self.plane.is_none() {
            self.plane = Some(polygons[0].plane.clone());
        }
        let plane = self.plane.clone().unwrap();

        let splitter = Splitter::for_polygon_count(polygons.len());
        let (coplanar_front, coplanar_back, front, back) =
            splitter.split(&plane, polygons);

        // Coplanar polygons, whichever way they face, live at this node.
        self.polygons.extend(coplanar_front);
        self.polygons.extend(coplanar_back);

        if !front.is_empty() {
            if self.front.is_none() {
                self.front = Some(Box::new(Node::new(&[])));
            }
            self.front.as_mut().unwrap().build(&front);
        }
        if !back.is_empty() {
            if self.back.is_none() {
                self.back = Some(Box::new(Node::new(&[])));
            }
            self.back.as_mut().unwrap().build(&back);
        }
    }
}
