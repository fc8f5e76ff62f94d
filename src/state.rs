//! Pipeline state, thoughts, and the per-field merge policy.
//!
//! Every pipeline variant declares its state once with [`pipeline_state!`].
//! The declaration names each field together with its merge policy, and the
//! macro generates the state struct, a partial-update struct, the declared
//! policy table, and the [`Merge`] implementation. Policies are applied by
//! the two functions in this module, so no stage decides for itself whether
//! a field accumulates.
//!
//! # Example
//!
//! ```ignore
//! pipeline_state! {
//!     pub struct ReportState, update ReportUpdate {
//!         overwrite query: String,
//!         append sections: Vec<String>,
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A single reasoning note left by a stage.
///
/// Exactly one is produced per stage execution. Thoughts are never mutated
/// after creation and their order is the order in which stages ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    pub agent: String,
    pub thought: String,
    pub timestamp: String,
}

impl Thought {
    /// Create a thought stamped with the current UTC time.
    pub fn new(agent: impl Into<String>, thought: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            thought: thought.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// How a partial update is folded into the accumulated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Concatenate the update onto the existing list
    Append,
    /// Replace the existing value
    Overwrite,
}

/// A declared field and its merge policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldPolicy {
    pub name: &'static str,
    pub policy: MergePolicy,
}

impl FieldPolicy {
    pub const fn new(name: &'static str, policy: MergePolicy) -> Self {
        Self { name, policy }
    }
}

/// Apply the append policy: extend `target` with `value`, preserving order.
pub fn append<T>(target: &mut Vec<T>, value: Vec<T>) {
    target.extend(value);
}

/// Apply the overwrite policy.
pub fn overwrite<T>(target: &mut T, value: T) {
    *target = value;
}

/// Policy-driven merge, generated by [`pipeline_state!`].
pub trait Merge {
    /// Partial update produced by a stage. Absent fields are left untouched.
    type Update: Default + Send;

    /// Every field of the state with its declared policy.
    const FIELDS: &'static [FieldPolicy];

    /// Fold a partial update into the state according to [`Self::FIELDS`].
    fn merge(&mut self, update: Self::Update);

    /// Append a stage's thought and overwrite the control fields.
    fn record(&mut self, thought: Thought, next_step: &str);

    /// Overwrite the control fields without recording a thought.
    fn set_control(&mut self, agent: &str, next_step: &str);

    fn thoughts(&self) -> &[Thought];
    fn current_agent(&self) -> &str;
    fn next_step(&self) -> &str;

    /// Look up the declared policy for a field.
    fn policy_of(name: &str) -> Option<MergePolicy> {
        Self::FIELDS
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.policy)
    }
}

/// The state of one pipeline variant.
///
/// The seed is whatever the caller supplies to start an invocation; every
/// field it does not set starts from its empty default.
pub trait PipelineState: Merge + Clone + Default + Serialize + Send + Sync + 'static {
    type Seed: Send;

    fn from_seed(seed: Self::Seed) -> Self;
}

/// Declare a pipeline state with per-field merge policies.
///
/// Each field is written as `<policy> <name>: <type>` where policy is
/// `append` (only valid for `Vec<T>`) or `overwrite`. The generated state
/// always carries `thoughts` (append), `current_agent` and `next_step`
/// (overwrite) in addition to the declared fields.
#[macro_export]
macro_rules! pipeline_state {
    (@policy append) => {
        $crate::state::MergePolicy::Append
    };
    (@policy overwrite) => {
        $crate::state::MergePolicy::Overwrite
    };
    (
        $(#[$meta:meta])*
        pub struct $state:ident, update $update:ident {
            $(
                $(#[$fmeta:meta])*
                $policy:ident $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default)]
        pub struct $state {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
            /// Stage reasoning in execution order.
            pub thoughts: ::std::vec::Vec<$crate::state::Thought>,
            pub current_agent: ::std::string::String,
            pub next_step: ::std::string::String,
        }

        #[doc = concat!("Partial update for [`", stringify!($state), "`].")]
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $update {
            $(
                pub $field: ::std::option::Option<$ty>,
            )*
        }

        impl $crate::state::Merge for $state {
            type Update = $update;

            const FIELDS: &'static [$crate::state::FieldPolicy] = &[
                $(
                    $crate::state::FieldPolicy::new(
                        stringify!($field),
                        $crate::pipeline_state!(@policy $policy),
                    ),
                )*
                $crate::state::FieldPolicy::new("thoughts", $crate::state::MergePolicy::Append),
                $crate::state::FieldPolicy::new("current_agent", $crate::state::MergePolicy::Overwrite),
                $crate::state::FieldPolicy::new("next_step", $crate::state::MergePolicy::Overwrite),
            ];

            fn merge(&mut self, update: $update) {
                $(
                    if let ::std::option::Option::Some(value) = update.$field {
                        $crate::state::$policy(&mut self.$field, value);
                    }
                )*
            }

            fn record(&mut self, thought: $crate::state::Thought, next_step: &str) {
                let agent = thought.agent.clone();
                $crate::state::append(&mut self.thoughts, vec![thought]);
                $crate::state::overwrite(&mut self.current_agent, agent);
                $crate::state::overwrite(&mut self.next_step, next_step.to_string());
            }

            fn set_control(&mut self, agent: &str, next_step: &str) {
                $crate::state::overwrite(&mut self.current_agent, agent.to_string());
                $crate::state::overwrite(&mut self.next_step, next_step.to_string());
            }

            fn thoughts(&self) -> &[$crate::state::Thought] {
                &self.thoughts
            }

            fn current_agent(&self) -> &str {
                &self.current_agent
            }

            fn next_step(&self) -> &str {
                &self.next_step
            }
        }
    };
}
