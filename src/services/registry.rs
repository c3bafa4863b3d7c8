//! Formatter Registry
//!
//! Thread-safe catalogue of formatter and processor plugins.
//!
//! Formatters are indexed by id, by supported format, and by the tools their
//! affinity prefers. Registration order is kept so that every listing and
//! ranking is deterministic: ties always resolve to the earlier registration.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use result_formatting_core::{
    formats, CoreError, CoreResult, FormatContext, Formatter, Processor, ToolExecutionResult,
};
use tracing::{debug, info, warn};

use crate::models::health::RegistryHealth;

/// Composite score bonus for a formatter whose affinity prefers the tool.
pub const TOOL_PREFERENCE_BONUS: i64 = 1000;
/// Composite score bonus for a matching declared output shape.
pub const SHAPE_MATCH_BONUS: i64 = 100;
/// Multiplier applied to a formatter's own priority.
pub const PRIORITY_WEIGHT: i64 = 10;

#[derive(Default)]
struct RegistryState {
    formatters: HashMap<String, Arc<dyn Formatter>>,
    /// Insertion order for deterministic iteration.
    order: Vec<String>,
    /// format tag -> formatter ids, in registration order
    by_format: HashMap<String, Vec<String>>,
    /// tool id -> formatter ids preferring that tool
    by_tool: HashMap<String, Vec<String>>,
    processors: HashMap<String, Arc<dyn Processor>>,
    processor_order: Vec<String>,
}

impl RegistryState {
    fn ordered_formatters(&self) -> Vec<Arc<dyn Formatter>> {
        self.order
            .iter()
            .filter_map(|id| self.formatters.get(id))
            .cloned()
            .collect()
    }

    fn index(&mut self, formatter: &Arc<dyn Formatter>) {
        let id = formatter.id().to_string();
        for format in formatter.supported_formats() {
            let ids = self.by_format.entry(format).or_default();
            if !ids.contains(&id) {
                ids.push(id.clone());
            }
        }
        if let Some(compat) = formatter.tool_compatibility() {
            for tool in compat.preferred_tools {
                let ids = self.by_tool.entry(tool).or_default();
                if !ids.contains(&id) {
                    ids.push(id.clone());
                }
            }
        }
    }

    /// Remove `id` from every secondary index, dropping buckets left empty.
    fn unindex(&mut self, id: &str) {
        for ids in self.by_format.values_mut() {
            ids.retain(|i| i != id);
        }
        self.by_format.retain(|_, ids| !ids.is_empty());

        for ids in self.by_tool.values_mut() {
            ids.retain(|i| i != id);
        }
        self.by_tool.retain(|_, ids| !ids.is_empty());
    }

    /// Sort bucket ids into global registration order.
    fn in_registration_order(&self, ids: &[String]) -> Vec<Arc<dyn Formatter>> {
        self.order
            .iter()
            .filter(|id| ids.contains(*id))
            .filter_map(|id| self.formatters.get(id))
            .cloned()
            .collect()
    }
}

/// Registry of formatter and processor plugins.
pub struct FormatterRegistry {
    state: RwLock<RegistryState>,
}

impl FormatterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // ── Formatters ──────────────────────────────────────────────────────

    /// Register a formatter. Replaces any existing formatter with the same id.
    pub fn register(&self, formatter: Arc<dyn Formatter>) -> CoreResult<()> {
        let id = formatter.id().to_string();
        if id.trim().is_empty() {
            return Err(CoreError::validation("formatter id is required"));
        }
        // Indices key on `id()` verbatim, so it must already be canonical
        if id.trim() != id {
            return Err(CoreError::validation(format!(
                "formatter id '{}' has surrounding whitespace",
                id
            )));
        }
        if formatter.name().trim().is_empty() {
            return Err(CoreError::validation(format!(
                "formatter '{}' has no name",
                id
            )));
        }
        if formatter.supported_formats().is_empty() {
            return Err(CoreError::validation(format!(
                "formatter '{}' declares no supported formats",
                id
            )));
        }

        let mut state = self.write();
        if state.formatters.contains_key(&id) {
            warn!(formatter_id = %id, "Formatter already registered, overwriting");
            state.unindex(&id);
        } else {
            state.order.push(id.clone());
        }
        state.index(&formatter);
        state.formatters.insert(id.clone(), formatter);

        info!(formatter_id = %id, total = state.formatters.len(), "Registered formatter");
        Ok(())
    }

    /// Unregister a formatter by id. Returns false if it was not registered.
    pub fn unregister(&self, id: &str) -> bool {
        let mut state = self.write();
        if state.formatters.remove(id).is_none() {
            return false;
        }
        state.order.retain(|i| i != id);
        state.unindex(id);
        info!(formatter_id = %id, "Unregistered formatter");
        true
    }

    /// Look up a formatter by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Formatter>> {
        self.read().formatters.get(id).cloned()
    }

    /// All formatter ids in registration order.
    pub fn formatter_ids(&self) -> Vec<String> {
        self.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.read().formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().formatters.is_empty()
    }

    /// Remove every formatter and processor.
    pub fn clear(&self) {
        let mut state = self.write();
        *state = RegistryState::default();
        debug!("Registry cleared");
    }

    /// Formatters supporting `format`, highest priority first.
    pub fn get_formatters_by_format(&self, format: &str) -> Vec<Arc<dyn Formatter>> {
        let state = self.read();
        let mut formatters = match state.by_format.get(format) {
            Some(ids) => state.in_registration_order(ids),
            None => return Vec::new(),
        };
        // sort_by is stable: equal priorities keep registration order
        formatters.sort_by(|a, b| b.priority().cmp(&a.priority()));
        formatters
    }

    /// Formatters whose affinity prefers `tool_id`, in registration order.
    pub fn get_formatters_for_tool(&self, tool_id: &str) -> Vec<Arc<dyn Formatter>> {
        let state = self.read();
        match state.by_tool.get(tool_id) {
            Some(ids) => state.in_registration_order(ids),
            None => Vec::new(),
        }
    }

    /// Formatters able to handle `result`, best candidate first.
    ///
    /// A formatter whose `can_format` returns an error is treated as
    /// incompatible. Candidates are ranked by `composite_score`; ties keep
    /// registration order.
    pub fn get_compatible_formatters(
        &self,
        result: &ToolExecutionResult,
        ctx: &FormatContext,
    ) -> Vec<Arc<dyn Formatter>> {
        // Snapshot so plugin code never runs under the lock
        let candidates = self.read().ordered_formatters();

        let mut scored: Vec<(i64, Arc<dyn Formatter>)> = candidates
            .into_iter()
            .filter(|f| match f.can_format(result, ctx) {
                Ok(compatible) => compatible,
                Err(e) => {
                    warn!(formatter_id = f.id(), error = %e, "can_format failed, treating as incompatible");
                    false
                }
            })
            .map(|f| (composite_score(f.as_ref(), result, ctx), f))
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(
            tool_id = %ctx.tool_id,
            candidates = scored.len(),
            "Resolved compatible formatters"
        );
        scored.into_iter().map(|(_, f)| f).collect()
    }

    // ── Processors ──────────────────────────────────────────────────────

    /// Register a processor. Replaces any existing processor with the same id.
    pub fn register_processor(&self, processor: Arc<dyn Processor>) -> CoreResult<()> {
        let id = processor.id().to_string();
        if id.trim().is_empty() {
            return Err(CoreError::validation("processor id is required"));
        }
        if id.trim() != id {
            return Err(CoreError::validation(format!(
                "processor id '{}' has surrounding whitespace",
                id
            )));
        }

        let mut state = self.write();
        if state.processors.contains_key(&id) {
            warn!(processor_id = %id, "Processor already registered, overwriting");
        } else {
            state.processor_order.push(id.clone());
        }
        state.processors.insert(id.clone(), processor);
        info!(processor_id = %id, "Registered processor");
        Ok(())
    }

    /// Unregister a processor by id. Returns false if it was not registered.
    pub fn unregister_processor(&self, id: &str) -> bool {
        let mut state = self.write();
        if state.processors.remove(id).is_none() {
            return false;
        }
        state.processor_order.retain(|i| i != id);
        true
    }

    /// Processors in execution order (priority descending).
    pub fn get_processors(&self) -> Vec<Arc<dyn Processor>> {
        let state = self.read();
        let mut processors: Vec<Arc<dyn Processor>> = state
            .processor_order
            .iter()
            .filter_map(|id| state.processors.get(id))
            .cloned()
            .collect();
        processors.sort_by(|a, b| b.priority().cmp(&a.priority()));
        processors
    }

    pub fn processor_count(&self) -> usize {
        self.read().processors.len()
    }

    // ── Health ──────────────────────────────────────────────────────────

    /// Check that formatters exist and every baseline format is covered.
    pub fn health_check(&self) -> RegistryHealth {
        let state = self.read();

        let supported: BTreeSet<String> = state.by_format.keys().cloned().collect();
        let missing_formats: Vec<String> = formats::BASELINE
            .iter()
            .filter(|f| !supported.contains(**f))
            .map(|f| f.to_string())
            .collect();
        let formatter_count = state.formatters.len();

        RegistryHealth {
            healthy: formatter_count > 0 && missing_formats.is_empty(),
            formatter_count,
            processor_count: state.processors.len(),
            supported_formats: supported.into_iter().collect(),
            missing_formats,
        }
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranking score of a formatter for a given result and context.
///
/// Tool preference dominates, then declared output-shape fit, then the
/// formatter's own priority.
pub fn composite_score(
    formatter: &dyn Formatter,
    result: &ToolExecutionResult,
    ctx: &FormatContext,
) -> i64 {
    let mut score = i64::from(formatter.priority()) * PRIORITY_WEIGHT;

    if let Some(compat) = formatter.tool_compatibility() {
        if compat.prefers(&ctx.tool_id) {
            score += TOOL_PREFERENCE_BONUS;
        } else if compat.excludes(&ctx.tool_id) {
            score -= TOOL_PREFERENCE_BONUS;
        }

        match compat.matches_shape(result.output_shape()) {
            Some(true) => score += SHAPE_MATCH_BONUS,
            Some(false) => score -= SHAPE_MATCH_BONUS,
            None => {}
        }
    }

    score
}

// ============================================================================
// Tests
// ============================================================================
