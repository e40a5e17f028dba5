use catlog_types::{Event, FilterCriteria};

/// Filter, sort and truncate stage for collected events
///
/// Sorting compares canonical timestamps as strings. That is chronological
/// only while all events share one UTC offset; events from either side of a
/// DST change, or from differently zoned hosts, can come out of order.
#[derive(Clone, Debug, Default)]
pub struct FilterPipeline {
    criteria: FilterCriteria,
}

impl FilterPipeline {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    /// Check if an event passes the actor, host and kind filters
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(actor) = &self.criteria.actor {
            if actor != event.actor() {
                return false;
            }
        }

        if let Some(host) = &self.criteria.host {
            if host != event.host() {
                return false;
            }
        }

        if let Some(prefixes) = &self.criteria.kind_prefixes {
            let kind = event.kind().as_str();
            if !prefixes.iter().any(|prefix| kind.starts_with(prefix)) {
                return false;
            }
        }

        true
    }

    /// Filter, stable-sort by time, then apply the row cap
    ///
    /// Events with equal timestamps keep their input order.
    pub fn apply(&self, events: Vec<Event>) -> Vec<Event> {
        let mut rows: Vec<Event> = events.into_iter().filter(|e| self.matches(e)).collect();
        rows.sort_by(|a, b| a.time().cmp(b.time()));

        if let Some(limit) = self.criteria.effective_limit() {
            rows.truncate(limit);
        }

        rows
    }
}

/// Run the filter pipeline once
pub fn apply(events: Vec<Event>, criteria: &FilterCriteria) -> Vec<Event> {
    FilterPipeline::new(criteria.clone()).apply(events)
}
