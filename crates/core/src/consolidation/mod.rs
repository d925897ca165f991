//! The staged consolidation pipeline.
//!
//! A consolidation run is a durable job whose persisted `steps` array is
//! the ground truth. The seven steps execute strictly in order — Validate,
//! Translate, Aggregate, MatchIntercompany, Eliminate,
//! NonControllingInterest, GenerateTrialBalance — and every step is a pure
//! function of the run's frozen inputs, so a crashed run resumes
//! deterministically from its first non-completed step.
//!
//! Balances throughout the pipeline are signed: positive is a net debit,
//! negative a net credit. A balanced trial balance therefore sums to zero.

pub mod aggregate;
pub mod eliminate;
pub mod error;
pub mod nci;
pub mod pipeline;
pub mod translate;
pub mod trial_balance;
pub mod types;
pub mod validate;

pub use error::ConsolidationError;
pub use pipeline::{ConsolidationPipeline, RunInputs};
pub use validate::MemberCompanyInfo;
pub use types::{
    AccountSelector, AggregatedBalance, ConsolidatedRow, ConsolidatedTrialBalance,
    ConsolidationGroup, ConsolidationMethod, ConsolidationRun, ConsolidationStep,
    EliminationEntry, EliminationLine, EliminationRule, EliminationRuleType, GroupMember,
    MemberBalance, MemberTrialBalance, RunOptions, RunStatus, StepState, StepStatus,
    TranslationRates, ValidationIssue, ValidationReport,
};
