use indexmap::{IndexMap, map::Entry};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::{
    Advice, Advisor, Context, DisallowCommit, InsertMustSpecifyColumn, NamingTableFormat,
    NoLeadingWildcardLike, NoSelectAll, RequirePrimaryKey, RuleConfig, RuleLevel, RuleReport,
    RuleType, WhereRequire
};
use crate::{
    error::ReviewError,
    parser::{Engine, StatementTree}
};

type AdvisorKey = (Engine, RuleType);

/// Collects advisors before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    advisors: IndexMap<AdvisorKey, Box<dyn Advisor>>
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `advisor` for `(engine, rule)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::DuplicateAdvisor`] when the key is taken.
    pub fn register<A>(
        &mut self,
        engine: Engine,
        rule: RuleType,
        advisor: A
    ) -> Result<&mut Self, ReviewError>
    where
        A: Advisor + 'static
    {
        match self.advisors.entry((engine, rule)) {
            Entry::Occupied(_) => Err(ReviewError::DuplicateAdvisor {
                engine,
                rule
            }),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(advisor));
                Ok(self)
            }
        }
    }

    pub fn build(self) -> Registry {
        debug!(advisors = self.advisors.len(), "advisor registry built");
        Registry {
            advisors: self.advisors
        }
    }
}

/// Read-only map from `(engine, rule type)` to advisor.
///
/// # Example
///
/// ```
/// use sql_review::{
///     advisor::{Registry, RuleType},
///     parser::Engine
/// };
///
/// let registry = Registry::builtin().unwrap();
/// assert!(registry.advisor(Engine::MySql, RuleType::StatementDisallowCommit).is_ok());
/// assert!(registry.advisor(Engine::Postgres, RuleType::StatementDisallowCommit).is_err());
/// ```
pub struct Registry {
    advisors: IndexMap<AdvisorKey, Box<dyn Advisor>>
}

impl Registry {
    /// Registry with every built-in advisor.
    pub fn builtin() -> Result<Self, ReviewError> {
        let mut builder = RegistryBuilder::new();
        for engine in Engine::ALL {
            builder
                .register(
                    engine,
                    RuleType::StatementInsertMustSpecifyColumn,
                    InsertMustSpecifyColumn
                )?
                .register(engine, RuleType::StatementRequireWhere, WhereRequire)?
                .register(engine, RuleType::StatementNoSelectAll, NoSelectAll)?
                .register(
                    engine,
                    RuleType::StatementNoLeadingWildcardLike,
                    NoLeadingWildcardLike
                )?
                .register(engine, RuleType::TableRequirePk, RequirePrimaryKey)?
                .register(engine, RuleType::NamingTable, NamingTableFormat)?;
        }
        builder.register(
            Engine::MySql,
            RuleType::StatementDisallowCommit,
            DisallowCommit
        )?;
        Ok(builder.build())
    }

    /// Advisor for `(engine, rule)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::UnsupportedRule`] when none is registered.
    pub fn advisor(&self, engine: Engine, rule: RuleType) -> Result<&dyn Advisor, ReviewError> {
        self.advisors
            .get(&(engine, rule))
            .map(|a| a.as_ref())
            .ok_or(ReviewError::UnsupportedRule {
                engine,
                rule
            })
    }

    /// Registered keys in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (Engine, RuleType)> + '_ {
        self.advisors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }

    /// Every rule registered for `engine` at its default level.
    pub fn default_rules(&self, engine: Engine) -> Vec<RuleConfig> {
        self.entries()
            .filter(|(e, _)| *e == engine)
            .map(|(_, rule)| RuleConfig::new(rule, rule.default_level()))
            .collect()
    }

    /// Run the rule of `ctx` and return its advice.
    ///
    /// The result is never empty: when the rule found nothing, or is
    /// disabled, it holds exactly one success sentinel.
    pub fn check(&self, ctx: &Context<'_>) -> Result<Vec<Advice>, ReviewError> {
        let advisor = self.advisor(ctx.engine, ctx.rule.rule_type)?;
        let mut advice = if ctx.rule.level == RuleLevel::Disabled {
            Vec::new()
        } else {
            advisor.check(ctx)?
        };
        trace!(
            rule = %ctx.rule.rule_type,
            engine = %ctx.engine,
            findings = advice.len(),
            "rule checked"
        );
        if advice.is_empty() {
            advice.push(Advice::ok());
        }
        Ok(advice)
    }

    /// Run every enabled rule of `rules` over `statements` in parallel.
    ///
    /// Reports come back in configuration order.
    pub fn review(
        &self,
        engine: Engine,
        statements: &[StatementTree],
        rules: &[RuleConfig]
    ) -> Result<Vec<RuleReport>, ReviewError> {
        let reports = rules
            .par_iter()
            .filter(|rule| rule.level != RuleLevel::Disabled)
            .map(|rule| {
                let advice = self.check(&Context::new(engine, statements, rule))?;
                Ok(RuleReport {
                    engine,
                    rule: rule.rule_type,
                    level: rule.level,
                    advice
                })
            })
            .collect::<Result<Vec<_>, ReviewError>>()?;
        debug!(
            engine = %engine,
            statements = statements.len(),
            rules = reports.len(),
            "review finished"
        );
        Ok(reports)
    }
}
