//! Composite execution scenarios.

use crate::{
    analysis::callsite::CallSite,
    analysis::composite::MethodPath,
    callgraph::CallGraph,
    model::MethodId,
};

/// Execution of one method within a composite path.
///
/// The entry frame has neither a caller nor an originating call site; every
/// subsequent frame records the index of the frame whose path contains the
/// call that produced it, plus that call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodExecution {
    /// The intraprocedural path this frame runs.
    pub path: MethodPath,
    /// Index of the calling frame within the composite path, if any.
    pub caller: Option<usize>,
    /// The call site that produced this frame, if any.
    pub call_site: Option<CallSite>,
}

/// A complete execution scenario through the application.
///
/// An ordered sequence of [`MethodExecution`] frames rooted at an entry
/// point. Immutable after construction: combining a scenario with a callee
/// frame copies the execution list, so prior scenarios are never disturbed
/// by further expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositePath {
    /// The entry-point method of this scenario.
    entry_point: MethodId,
    /// Frames in creation order; the first one is the entry frame.
    executions: Vec<MethodExecution>,
}

impl CompositePath {
    /// Creates an initial scenario holding only the entry frame.
    ///
    /// # Arguments
    ///
    /// * `entry_point` - The entry-point method
    /// * `entry_path` - The intraprocedural path through it
    #[must_use]
    pub fn initial(entry_point: MethodId, entry_path: MethodPath) -> Self {
        CompositePath {
            entry_point,
            executions: vec![MethodExecution {
                path: entry_path,
                caller: None,
                call_site: None,
            }],
        }
    }

    /// Creates a new scenario by appending a callee frame.
    ///
    /// The caller frame is the first execution whose path runs through the
    /// call site's calling method.
    ///
    /// # Arguments
    ///
    /// * `call_site` - The call being resolved
    /// * `callee_path` - The chosen intraprocedural path through the callee
    #[must_use]
    pub fn combine(&self, call_site: CallSite, callee_path: MethodPath) -> Self {
        let caller_index = self
            .executions
            .iter()
            .position(|e| e.path.method() == call_site.caller);

        let mut executions = self.executions.clone();
        executions.push(MethodExecution {
            path: callee_path,
            caller: caller_index,
            call_site: Some(call_site),
        });

        CompositePath {
            entry_point: self.entry_point,
            executions,
        }
    }

    /// Returns the entry-point method of this scenario.
    #[must_use]
    pub const fn entry_point(&self) -> MethodId {
        self.entry_point
    }

    /// Returns the frames of this scenario.
    #[must_use]
    pub fn executions(&self) -> &[MethodExecution] {
        &self.executions
    }

    /// Returns the call depth: the number of frames.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.executions.len()
    }

    /// Returns the total number of blocks across all frames.
    #[must_use]
    pub fn total_blocks(&self) -> usize {
        self.executions.iter().map(|e| e.path.len()).sum()
    }

    /// Renders a human-readable one-line summary.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - Used to resolve method names
    #[must_use]
    pub fn summary(&self, call_graph: &CallGraph) -> String {
        let entry_name = call_graph
            .method(self.entry_point)
            .map_or_else(|| self.entry_point.to_string(), |d| d.name().to_string());
        let mut out = format!("Entry: {entry_name}");

        for execution in &self.executions {
            if execution.caller.is_some() {
                let name = call_graph
                    .method(execution.path.method())
                    .map_or_else(|| execution.path.method().to_string(), |d| d.name().to_string());
                out.push_str(&format!(" -> {name}"));
            }
        }

        out.push_str(&format!(" ({} blocks)", self.total_blocks()));
        out
    }
}
