//! The render session, work-loop driver and commit phase.

use std::sync::Arc;

use crate::element::{Children, Element, PropValue, Props};
use crate::host::{HostError, HostTree, NodeId};
use crate::platform::{Deadline, IdleScheduler, NoopScheduler};
use crate::work::{UnitId, WorkKind, WorkTree, ROOT};

/// What a single idle pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// No session, or the session was already committed.
    Idle,
    /// The deadline asked for a yield; the session resumes next pass.
    Yielded,
    /// The tree was exhausted and committed this pass.
    Committed,
}

/// State of one render-to-commit cycle.
///
/// Replaced wholesale by every render call; `current` is the exact unit
/// the next pass resumes from and becomes absent once the tree is fully
/// walked.
struct RenderSession {
    tree: WorkTree,
    current: Option<UnitId>,
}

/// Drives the work loop for one render target.
///
/// Owns the host tree, the idle scheduler handle and at most one active
/// session. All work happens on the caller's thread: [`render`] only seeds
/// the session and requests an idle slot; host mutation happens inside
/// [`run_idle_pass`].
///
/// [`render`]: Renderer::render
/// [`run_idle_pass`]: Renderer::run_idle_pass
pub struct Renderer<H: HostTree> {
    host: H,
    scheduler: Arc<dyn IdleScheduler>,
    session: Option<RenderSession>,
}

impl<H: HostTree> Renderer<H> {
    pub fn new(host: H) -> Self {
        Self::with_scheduler(host, Arc::new(NoopScheduler))
    }

    pub fn with_scheduler(host: H, scheduler: Arc<dyn IdleScheduler>) -> Self {
        Self {
            host,
            scheduler,
            session: None,
        }
    }

    /// Seeds a new session rendering `element` into `container`.
    ///
    /// Fully replaces any previous session; nothing of an earlier cycle's
    /// work tree is inspected or reused. The host tree is not touched here,
    /// only on subsequent idle passes.
    pub fn render(&mut self, element: Element, container: NodeId) {
        log::debug!("render seeded into container {container}");
        self.session = Some(RenderSession {
            tree: WorkTree::seed(container, element),
            current: Some(ROOT),
        });
        self.scheduler.schedule_idle();
    }

    /// Whether a session still has units to process.
    pub fn has_pending_work(&self) -> bool {
        matches!(&self.session, Some(session) if session.current.is_some())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Runs one idle slot's worth of work.
    ///
    /// Processes units until the tree is exhausted or `deadline` asks for a
    /// yield, committing the finished tree in the exhausting pass. At least
    /// one unit is processed per non-idle pass, so a starved deadline still
    /// makes progress. The scheduler is re-armed on every outcome,
    /// including errors and no-op passes.
    ///
    /// A host failure aborts the pass: the half-built session can never
    /// complete and is discarded, and the error is returned.
    pub fn run_idle_pass(&mut self, deadline: &dyn Deadline) -> Result<PassOutcome, HostError> {
        let outcome = match self.session.as_mut() {
            Some(session) => Self::drive(&mut self.host, session, deadline),
            None => Ok(PassOutcome::Idle),
        };
        self.scheduler.schedule_idle();
        match outcome {
            Ok(outcome) => {
                log::debug!("idle pass finished: {outcome:?}");
                Ok(outcome)
            }
            Err(err) => {
                log::error!("render pass aborted: {err}");
                self.session = None;
                Err(err)
            }
        }
    }

    fn drive(
        host: &mut H,
        session: &mut RenderSession,
        deadline: &dyn Deadline,
    ) -> Result<PassOutcome, HostError> {
        let Some(mut current) = session.current else {
            return Ok(PassOutcome::Idle);
        };
        loop {
            match session.tree.perform(host, current)? {
                Some(next) => {
                    session.current = Some(next);
                    if deadline.should_yield() {
                        log::trace!("pass yielded before unit {next}");
                        return Ok(PassOutcome::Yielded);
                    }
                    current = next;
                }
                None => {
                    session.current = None;
                    break;
                }
            }
        }
        // the whole tree is built; attach and decorate in one pass
        log::debug!("work tree exhausted after {} units", session.tree.len());
        if let Some(first) = session.tree.unit(ROOT).first_child() {
            Self::commit(host, &session.tree, first)?;
        }
        Ok(PassOutcome::Committed)
    }

    /// Attaches `id`'s subtree depth-first: the unit itself, then its child
    /// subtree, then its sibling subtree.
    fn commit(host: &mut H, tree: &WorkTree, id: UnitId) -> Result<(), HostError> {
        log::trace!("commit unit {id}");
        let unit = tree.unit(id);
        if let Some(node) = unit.visual() {
            let parent_node = Self::nearest_host_ancestor(tree, id);
            host.append_child(parent_node, node)?;
            Self::apply_properties(host, node, unit.props())?;
        }
        if let Some(child) = unit.first_child() {
            Self::commit(host, tree, child)?;
        }
        if let Some(sibling) = unit.next_sibling() {
            Self::commit(host, tree, sibling)?;
        }
        Ok(())
    }

    /// Visual node of the nearest ancestor that has one.
    ///
    /// Component units are transparent here; the walk always terminates
    /// because the root unit carries the container.
    fn nearest_host_ancestor(tree: &WorkTree, id: UnitId) -> NodeId {
        let mut ancestor = tree
            .unit(id)
            .parent()
            .expect("committed units always have a parent");
        loop {
            let unit = tree.unit(ancestor);
            if let Some(node) = unit.visual() {
                return node;
            }
            debug_assert_eq!(unit.kind(), WorkKind::Component);
            ancestor = unit
                .parent()
                .expect("the root unit carries the container");
        }
    }

    fn apply_properties(host: &mut H, node: NodeId, props: &Props) -> Result<(), HostError> {
        for (name, value) in props.attrs() {
            match value {
                PropValue::Scalar(scalar) => {
                    host.set_attribute(node, name, &scalar.to_string())?;
                }
                PropValue::Handler(handler) if name.starts_with("on") && name.len() > 2 => {
                    let event = name[2..].to_ascii_lowercase();
                    host.add_listener(node, &event, handler.clone())?;
                }
                PropValue::Style(style) if name == "style" => {
                    for (property, value) in style {
                        host.set_style(node, property, value)?;
                    }
                }
                _ => {
                    log::debug!("ignoring property {name:?} with unsupported shape");
                }
            }
        }
        if let Children::Scalar(scalar) = props.children() {
            host.set_text_content(node, &scalar.to_string())?;
        }
        Ok(())
    }
}
