//! Mutation stage tracking
//!
//! Every command walks `Requested -> Identified -> StructurallyPlaced ->
//! PositionallyOrdered -> Committed`. Stages are only recorded on a working
//! copy of the store; a mutation that fails before `Committed` leaves no
//! trace outside `apply()`.

use std::fmt;

use tracing::debug;

/// Stage reached by a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MutationStage {
    Requested,
    Identified,
    StructurallyPlaced,
    PositionallyOrdered,
    Committed,
}

impl MutationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStage::Requested => "requested",
            MutationStage::Identified => "identified",
            MutationStage::StructurallyPlaced => "structurally_placed",
            MutationStage::PositionallyOrdered => "positionally_ordered",
            MutationStage::Committed => "committed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == MutationStage::Committed
    }
}

impl fmt::Display for MutationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a committed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Id of the entity the command targeted
    pub id: String,
    /// Stages passed, in order, ending with `Committed`
    pub stages: Vec<MutationStage>,
}

impl MutationOutcome {
    pub fn final_stage(&self) -> Option<MutationStage> {
        self.stages.last().copied()
    }
}

/// In-flight mutation inside `apply()`
#[derive(Debug)]
pub(crate) struct Mutation {
    op: &'static str,
    id: String,
    stages: Vec<MutationStage>,
}

impl Mutation {
    pub(crate) fn begin(op: &'static str) -> Self {
        Self {
            op,
            id: String::new(),
            stages: vec![MutationStage::Requested],
        }
    }

    pub(crate) fn identified(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.advance(MutationStage::Identified);
    }

    /// Record `stage`; stages never go backwards
    pub(crate) fn advance(&mut self, stage: MutationStage) {
        if self.stages.last().is_some_and(|last| *last >= stage) {
            return;
        }
        debug!(
            component = module_path!(),
            op = self.op,
            org_id = %self.id,
            stage = stage.as_str(),
            "stage"
        );
        self.stages.push(stage);
    }

    pub(crate) fn commit(mut self) -> MutationOutcome {
        self.advance(MutationStage::Committed);
        MutationOutcome {
            id: self.id,
            stages: self.stages,
        }
    }
}
