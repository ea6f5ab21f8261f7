//! Translation of prediction event arguments into the gold identifier space

use willeval_core::Event;

use crate::matcher::IdMap;

/// Rewrite every argument identifier found in `id_map` to its gold identifier.
///
/// Identifiers of unmatched entities are left as they are, so events that
/// reference them fail to match downstream. Returns the number of rewrites.
pub fn remap_event_arguments(events: &mut [Event], id_map: &IdMap) -> usize {
    let mut rewritten = 0;

    for event in events.iter_mut() {
        for fillers in event.arguments.values_mut() {
            for id in fillers.ids_mut() {
                if let Some(gold_id) = id_map.get(id.as_str()) {
                    id.clone_from(gold_id);
                    rewritten += 1;
                }
            }
        }
    }

    rewritten
}
