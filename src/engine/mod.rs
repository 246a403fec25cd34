pub mod builder;
pub mod predicate;
pub mod prune;
pub mod query;
pub mod template;
pub mod traverse;

use serde::Serialize;
use tracing::debug;

use crate::config::{self, CompilerConfig};
use crate::domain::assertion::{AssertionSet, Check};
use crate::domain::error::CompileError;
use crate::domain::matcher::Matcher;
use crate::domain::value::Value;
use crate::engine::template::{EscapingResolver, TemplateResolver};

/// Options for one compilation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub config: CompilerConfig,
    /// Caller-level switch; `Some(false)` disables size checks regardless of config.
    pub size_override: Option<bool>,
}

impl CompileOptions {
    pub fn size_check(&self) -> bool {
        config::size_assertions_enabled(&self.config, self.size_override)
    }
}

/// Compiled filter expression for one matcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatcherPredicate {
    #[serde(flatten)]
    pub matcher: Matcher,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledBody {
    pub assertions: AssertionSet,
    pub matchers: Vec<MatcherPredicate>,
}

/// Compiles a body and its matchers with the default template resolver.
pub fn compile_body(
    body: Option<&Value>,
    matchers: &[Matcher],
    options: CompileOptions,
) -> Result<CompiledBody, CompileError> {
    compile_body_with_resolver(body, matchers, options, &EscapingResolver)
}

/// Prunes matcher paths from a copy of `body`, collects assertions for what
/// is left, and compiles every matcher against the original body.
///
/// Emptiness is only asserted where the original body is empty too; a
/// container emptied by pruning yields no assertion.
pub fn compile_body_with_resolver(
    body: Option<&Value>,
    matchers: &[Matcher],
    options: CompileOptions,
    resolver: &dyn TemplateResolver,
) -> Result<CompiledBody, CompileError> {
    let assertions = match body {
        Some(body) => {
            let pruned = prune::remove_matching_paths(body, matchers);
            let mut assertions =
                traverse::collect_assertions(&pruned.document, options.size_check(), resolver);
            assertions.retain(|assertion| {
                let genuine =
                    assertion.check() != &Check::IsEmpty || query::verify(assertion, body);
                if !genuine {
                    debug!(path = %assertion.path(), "skipping container emptied by matchers");
                }
                genuine
            });
            assertions
        }
        None => AssertionSet::new(),
    };

    let matchers = matchers
        .iter()
        .map(|matcher| {
            let expression = predicate::compile_predicate(matcher, body).map_err(|source| {
                CompileError::Matcher {
                    path: matcher.path.clone(),
                    source,
                }
            })?;
            Ok(MatcherPredicate {
                matcher: matcher.clone(),
                expression,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;

    debug!(
        assertions = assertions.len(),
        matchers = matchers.len(),
        "compiled body"
    );
    Ok(CompiledBody {
        assertions,
        matchers,
    })
}
