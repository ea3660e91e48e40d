//! Agents listed in the METS header.

use mets_types::{require_non_empty, AgentRole, AgentType, OtherOr, TypeResult};

/// An agent of the METS header: who made the package and in what role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetsAgent {
    pub name: String,
    pub role: OtherOr<AgentRole>,
    pub agent_type: OtherOr<AgentType>,
}

impl MetsAgent {
    pub fn new(
        name: impl Into<String>,
        role: OtherOr<AgentRole>,
        agent_type: OtherOr<AgentType>,
    ) -> TypeResult<Self> {
        let name = name.into();
        require_non_empty("name", &name)?;
        Ok(Self {
            name,
            role,
            agent_type,
        })
    }

    /// Resolve role and type from vocabulary values and free-text overrides.
    ///
    /// A non-empty `other_role` turns the role into `OTHER`; an `OTHER` role
    /// without `other_role` is rejected. Type resolves the same way.
    pub fn resolve(
        name: impl Into<String>,
        role: Option<AgentRole>,
        other_role: Option<&str>,
        agent_type: Option<AgentType>,
        other_type: Option<&str>,
    ) -> TypeResult<Self> {
        Self::new(
            name,
            OtherOr::resolve(role, other_role)?,
            OtherOr::resolve(agent_type, other_type)?,
        )
    }
}
