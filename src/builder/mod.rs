//! Compile pipeline.
//!
//! ```text
//! AmTree ──NodeBuilder──► raw tree        (one node per constraint node,
//!                                          inputs, post-processing)
//!        ──Compactor────► compact tree    (flatten, filter, merge, collapse)
//!        ──IdBuilder────► identified tree (ids, cardinality ids, dependsOn)
//!        ──freeze───────► WebTemplate
//! ```
//!
//! Every compile owns its copy of the constraint tree (extended with the
//! nodes an archetype leaves implicit), its node arena and its id
//! deduplicator, so compiles can run concurrently against a shared
//! constraint tree.

mod context;
mod inputs;
mod node_builder;
mod synthetic;

pub use context::{BuilderContext, ExcludePathFilter, NoopPathFilter, PathFilter};
pub(crate) use node_builder::archetype_predicate;

use std::sync::Arc;

use crate::am::AmTree;
use crate::compact::Compactor;
use crate::error::{BuilderError, Result};
use crate::ids::{IdBuilder, IdDeduplicator, NumericSuffixDeduplicator};
use crate::template::WebTemplate;
use node_builder::NodeBuilder;

/// Compile `am` into a web template using the default id deduplicator.
pub fn compile(am: &AmTree, template_id: &str, context: &BuilderContext) -> Result<WebTemplate> {
    compile_with(am, template_id, context, &mut NumericSuffixDeduplicator::default())
}

/// Compile `am` with a caller supplied deduplicator.
///
/// The deduplicator must be fresh; ids it already handed out count as taken.
pub fn compile_with(
    am: &AmTree,
    template_id: &str,
    context: &BuilderContext,
    dedup: &mut dyn IdDeduplicator,
) -> Result<WebTemplate> {
    let start = match context.from.as_deref() {
        Some(path) if !path.trim().is_empty() => am.resolve_path(am.root(), path)?,
        _ => am.root(),
    };
    tracing::debug!("compiling {template_id} from {}", am.get(start).rm_type);

    let mut am = am.clone();
    let language = context.resolve_language(&am.language).to_string();
    synthetic::add_implicit_nodes(&mut am, start, &language);

    let (mut nodes, root) = NodeBuilder::new(&am, context).build(start);
    tracing::debug!("built {} raw nodes", nodes.len());

    let root = Compactor::new(&mut nodes, context.policy)
        .compact_root(root)
        .ok_or(BuilderError::EmptyTemplate)?;

    IdBuilder::new(&am, &mut nodes, dedup).build_ids(root)?;
    let root = nodes.retain_reachable(root);
    tracing::debug!("compiled {template_id} into {} nodes", nodes.len());

    let default_language = context
        .context_language
        .clone()
        .filter(|language| !language.trim().is_empty())
        .unwrap_or(language);
    let languages = context.all_languages(&am.language);

    Ok(WebTemplate::new(
        Arc::new(am),
        nodes,
        root,
        template_id.to_string(),
        default_language,
        languages,
    ))
}
