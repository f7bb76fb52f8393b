use admin_logging::{admin_debug, admin_warn};

use crate::{Effect, ListState, LoadFailure, LoadMode, Msg, SortDirection, SortField, SortSpec};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ListState, msg: Msg) -> (ListState, Vec<Effect>) {
    let effects = match msg {
        Msg::Opened { collection, mode } => {
            state.set_collection(collection);
            state.set_mode(mode);
            state.begin_load()
        }
        Msg::FilterChanged(filter) => {
            if !state.set_filter(filter) {
                return (state, Vec::new());
            }
            // A new filter changes the result set; paged views restart at page 1.
            if let LoadMode::Paged { .. } = state.mode() {
                state.set_mode(LoadMode::Paged { page: 1 });
            }
            state.begin_load()
        }
        Msg::PageRequested(page) => match state.mode() {
            LoadMode::Paged { .. } if state.set_mode(LoadMode::Paged { page }) => {
                state.begin_load()
            }
            _ => Vec::new(),
        },
        Msg::ModeChanged(mode) => {
            if state.set_mode(mode) {
                state.begin_load()
            } else {
                Vec::new()
            }
        }
        Msg::SortChanged(sort) => {
            if state.sort() != sort.as_ref() {
                state.set_sort(sort);
            }
            Vec::new()
        }
        Msg::SortColumnClicked(key) => {
            let next = match state.sort() {
                Some(current) if current.field.key == key => {
                    SortSpec::new(current.field.clone(), current.direction.toggled())
                }
                _ => SortSpec::new(SortField::infer(&key), SortDirection::Ascending),
            };
            state.set_sort(Some(next));
            Vec::new()
        }
        Msg::RefreshRequested => state.begin_load(),
        Msg::LoadProgress {
            generation,
            loaded,
            total,
        } => {
            if state.is_current(generation) {
                state.apply_progress(loaded, total);
            }
            Vec::new()
        }
        Msg::PageLoaded {
            generation,
            response,
        } => {
            if state.is_current(generation) {
                state.apply_loaded(response.items, response.total);
            } else {
                admin_debug!(
                    "Dropping stale page for {} generation={} current={:?}",
                    state.collection(),
                    generation,
                    state.in_flight()
                );
            }
            Vec::new()
        }
        Msg::CollectionLoaded {
            generation,
            records,
        } => {
            if state.is_current(generation) {
                let total = records.len() as u64;
                state.apply_loaded(records, total);
            } else {
                admin_debug!(
                    "Dropping stale collection for {} generation={} current={:?}",
                    state.collection(),
                    generation,
                    state.in_flight()
                );
            }
            Vec::new()
        }
        Msg::LoadFailed {
            generation,
            failure,
        } => {
            if !state.is_current(generation) {
                admin_debug!(
                    "Ignoring stale failure for {} generation={}: {:?}",
                    state.collection(),
                    generation,
                    failure
                );
                return (state, Vec::new());
            }
            admin_warn!("Loading {} failed: {:?}", state.collection(), failure);
            state.apply_failure(&failure);
            match failure {
                LoadFailure::Unauthorized => vec![Effect::RedirectToLogin],
                LoadFailure::Forbidden | LoadFailure::Other(_) => Vec::new(),
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
