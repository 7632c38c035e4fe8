//! The mutable work-unit tree mirroring one render pass.
//!
//! Units live in an arena and link to parent, first child and next sibling
//! by index. The begin phase expands one unit's children; the complete
//! phase materializes pending host nodes and walks sideways or upward to
//! the next unit. The parent chain doubles as the traversal stack, so a
//! pass can suspend between any two units and resume exactly where it
//! stopped.

use crate::element::{Children, Element, ElementType, Props};
use crate::host::{HostError, HostTree, NodeId};

/// Index of a work unit within its session's arena.
pub(crate) type UnitId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WorkKind {
    Component,
    HostRoot,
    Host,
}

pub(crate) struct WorkUnit {
    kind: WorkKind,
    ty: Option<ElementType>,
    props: Props,
    visual: Option<NodeId>,
    parent: Option<UnitId>,
    first_child: Option<UnitId>,
    next_sibling: Option<UnitId>,
}

impl WorkUnit {
    pub(crate) fn kind(&self) -> WorkKind {
        self.kind
    }

    pub(crate) fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn visual(&self) -> Option<NodeId> {
        self.visual
    }

    pub(crate) fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    pub(crate) fn first_child(&self) -> Option<UnitId> {
        self.first_child
    }

    pub(crate) fn next_sibling(&self) -> Option<UnitId> {
        self.next_sibling
    }
}

/// Arena of work units for one render-to-commit cycle.
///
/// Built from scratch on every render call; nothing survives into the next
/// cycle.
pub(crate) struct WorkTree {
    units: Vec<WorkUnit>,
}

/// The root unit is always the first allocation.
pub(crate) const ROOT: UnitId = 0;

impl WorkTree {
    /// Seeds the tree for a render target container and a root element.
    ///
    /// The root unit's visual node is preset to `container`; its sole child
    /// element sits in a one-element sequence, like any other child list.
    pub(crate) fn seed(container: NodeId, element: Element) -> Self {
        let root = WorkUnit {
            kind: WorkKind::HostRoot,
            ty: None,
            props: Props::new().with_children(Children::Many(vec![element])),
            visual: Some(container),
            parent: None,
            first_child: None,
            next_sibling: None,
        };
        Self { units: vec![root] }
    }

    pub(crate) fn unit(&self, id: UnitId) -> &WorkUnit {
        &self.units[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.units.len()
    }

    fn push(&mut self, unit: WorkUnit) -> UnitId {
        let id = self.units.len();
        self.units.push(unit);
        id
    }

    /// Builds fresh child units for `parent` from a children value.
    ///
    /// Bare scalars (and absent children) produce no units; a single
    /// element is treated as a one-element sequence. Each element becomes a
    /// unit in declared order, the first linked into `first_child`, the
    /// rest chained through `next_sibling`.
    fn reconcile_children(&mut self, parent: UnitId, children: Children) {
        let elements: Vec<Element> = match children {
            Children::One(element) => vec![*element],
            Children::Many(elements) => elements,
            Children::None | Children::Scalar(_) => {
                self.units[parent].first_child = None;
                return;
            }
        };
        let mut previous: Option<UnitId> = None;
        for element in elements {
            let (ty, props) = element.into_parts();
            let kind = match ty {
                ElementType::Component(_) => WorkKind::Component,
                ElementType::Host(_) => WorkKind::Host,
            };
            let id = self.push(WorkUnit {
                kind,
                ty: Some(ty),
                props,
                visual: None,
                parent: Some(parent),
                first_child: None,
                next_sibling: None,
            });
            match previous {
                None => self.units[parent].first_child = Some(id),
                Some(prev) => self.units[prev].next_sibling = Some(id),
            }
            previous = Some(id);
        }
    }

    /// Expands one unit and returns its first child as the next unit of
    /// work.
    ///
    /// Component units invoke their function with the unit's props; the
    /// returned children value is the only source of nested structure under
    /// them. Host units reconcile their declared children directly.
    pub(crate) fn begin(&mut self, id: UnitId) -> Option<UnitId> {
        log::trace!("begin unit {id}");
        match self.units[id].kind {
            WorkKind::Component => {
                let invoked = {
                    let unit = &self.units[id];
                    match &unit.ty {
                        Some(ElementType::Component(body)) => {
                            Some((body.clone(), unit.props.clone()))
                        }
                        _ => None,
                    }
                };
                if let Some((body, props)) = invoked {
                    let rendered = body(&props);
                    self.reconcile_children(id, rendered);
                }
            }
            WorkKind::HostRoot | WorkKind::Host => {
                let children = self.units[id].props.children().clone();
                self.reconcile_children(id, children);
            }
        }
        self.units[id].first_child
    }

    /// Finishes a unit whose begin phase yielded no child.
    ///
    /// Walks from `start` creating pending host nodes, returning the first
    /// sibling found on the way up as the next unit of work, or `None` once
    /// the parentless root is reached and the tree is exhausted.
    pub(crate) fn complete<H: HostTree>(
        &mut self,
        host: &mut H,
        start: UnitId,
    ) -> Result<Option<UnitId>, HostError> {
        let mut current = start;
        loop {
            log::trace!("complete unit {current}");
            let unit = &self.units[current];
            if unit.kind == WorkKind::Host && unit.visual.is_none() {
                // materialize now; attributes and listeners wait for commit
                let tag = match &unit.ty {
                    Some(ElementType::Host(tag)) => tag.clone(),
                    _ => unreachable!("host units always carry a host tag"),
                };
                let node = host.create_node(&tag)?;
                self.units[current].visual = Some(node);
            }
            if let Some(sibling) = self.units[current].next_sibling {
                return Ok(Some(sibling));
            }
            match self.units[current].parent {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    /// Performs one unit of work and returns the next one, if any.
    pub(crate) fn perform<H: HostTree>(
        &mut self,
        host: &mut H,
        id: UnitId,
    ) -> Result<Option<UnitId>, HostError> {
        match self.begin(id) {
            Some(next) => Ok(Some(next)),
            None => self.complete(host, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{component, create_element, Props};
    use crate::host::MemoryHost;

    fn exhaust(tree: &mut WorkTree, host: &mut MemoryHost) {
        let mut current = Some(ROOT);
        while let Some(id) = current {
            current = tree.perform(host, id).expect("unit of work");
        }
    }

    #[test]
    fn seed_wraps_the_root_element_in_a_sequence() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let tree = WorkTree::seed(container, create_element("div", Props::new(), vec![]));
        let root = tree.unit(ROOT);
        assert_eq!(root.kind(), WorkKind::HostRoot);
        assert_eq!(root.visual(), Some(container));
        assert!(matches!(root.props().children(), Children::Many(v) if v.len() == 1));
    }

    #[test]
    fn begin_links_children_in_declared_order() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let element = create_element(
            "div",
            Props::new(),
            vec![
                create_element("a", Props::new(), vec![]).into(),
                create_element("b", Props::new(), vec![]).into(),
            ],
        );
        let mut tree = WorkTree::seed(container, element);

        let div = tree.begin(ROOT).expect("root child");
        let a = tree.begin(div).expect("first child");
        let b = tree.unit(a).next_sibling().expect("second child");
        assert!(tree.unit(b).next_sibling().is_none());
        assert_eq!(tree.unit(a).parent(), Some(div));
        assert_eq!(tree.unit(b).parent(), Some(div));
    }

    #[test]
    fn scalar_children_produce_no_units() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let element = create_element("span", Props::new(), vec!["hi".into()]);
        let mut tree = WorkTree::seed(container, element);

        let span = tree.begin(ROOT).expect("root child");
        assert!(tree.begin(span).is_none());
        assert!(tree.unit(span).first_child().is_none());
    }

    #[test]
    fn complete_returns_sibling_before_walking_up() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let element = create_element(
            "div",
            Props::new(),
            vec![
                create_element("a", Props::new(), vec![]).into(),
                create_element("b", Props::new(), vec![]).into(),
            ],
        );
        let mut tree = WorkTree::seed(container, element);
        let div = tree.begin(ROOT).unwrap();
        let a = tree.begin(div).unwrap();
        assert!(tree.begin(a).is_none());

        let next = tree.complete(&mut host, a).unwrap();
        let b = tree.unit(a).next_sibling().unwrap();
        assert_eq!(next, Some(b));
        // a's node exists, b's does not yet
        assert!(tree.unit(a).visual().is_some());
        assert!(tree.unit(b).visual().is_none());
    }

    #[test]
    fn walking_up_materializes_ancestors_once() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let inner = create_element("span", Props::new(), vec![]);
        let element = create_element("div", Props::new(), vec![inner.into()]);
        let mut tree = WorkTree::seed(container, element);
        exhaust(&mut tree, &mut host);

        let div = tree.unit(ROOT).first_child().unwrap();
        let span = tree.unit(div).first_child().unwrap();
        let div_node = tree.unit(div).visual().expect("div node");
        let span_node = tree.unit(span).visual().expect("span node");
        assert_ne!(div_node, span_node);
        // container + div + span, nothing created twice
        assert_eq!(host.len(), 3);
    }

    #[test]
    fn component_units_expand_via_their_function() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let greeting = component(|props| {
            let name = match props.get("name") {
                Some(crate::element::PropValue::Scalar(scalar)) => scalar.to_string(),
                _ => String::new(),
            };
            create_element(
                "p",
                Props::new(),
                vec![format!("Hello {name}").into()],
            )
            .into()
        });
        let element = create_element(greeting, Props::new().attr("name", "x"), vec![]);
        let mut tree = WorkTree::seed(container, element);
        exhaust(&mut tree, &mut host);

        let unit = tree.unit(ROOT).first_child().unwrap();
        assert_eq!(tree.unit(unit).kind(), WorkKind::Component);
        // the component itself owns no host node
        assert!(tree.unit(unit).visual().is_none());
        let p = tree.unit(unit).first_child().expect("rendered child");
        assert_eq!(tree.unit(p).kind(), WorkKind::Host);
        assert!(tree.unit(p).visual().is_some());
    }

    #[test]
    fn component_returning_a_scalar_yields_no_children() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let bare = component(|_| "just text".into());
        let element = create_element(bare, Props::new(), vec![]);
        let mut tree = WorkTree::seed(container, element);
        exhaust(&mut tree, &mut host);

        let unit = tree.unit(ROOT).first_child().unwrap();
        assert!(tree.unit(unit).first_child().is_none());
        // only the container exists
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn host_failures_abort_completion() {
        let mut host = MemoryHost::new();
        let container = host.create_node("root").unwrap();
        let element = create_element("bad tag", Props::new(), vec![]);
        let mut tree = WorkTree::seed(container, element);
        let unit = tree.begin(ROOT).unwrap();
        assert!(tree.begin(unit).is_none());
        let err = tree.complete(&mut host, unit).unwrap_err();
        assert!(matches!(err, HostError::InvalidTag { .. }));
        assert!(tree.unit(unit).visual().is_none());
    }
}
