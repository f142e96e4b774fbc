use crate::cluster::SystemCluster;
use crate::observer::{Event, Observer};
use crate::policy::ClusterPolicy;
use archmap_protocol::OTHER_SYSTEM;
use std::collections::BTreeMap;

/// Why a cluster ended up in the `other` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldReason {
    /// Fewer files than `min_system_files`
    BelowMinimum,
    /// `max_systems` already promoted
    OverCap,
    /// Derived name collides with the reserved `other` key
    Reserved,
}

impl FoldReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FoldReason::BelowMinimum => "below_minimum",
            FoldReason::OverCap => "over_cap",
            FoldReason::Reserved => "reserved",
        }
    }
}

/// Promote clusters to systems, largest first, folding the rest into `other`.
///
/// The result is a strict partition of the input clusters' files. The `other`
/// entry is present only when at least one cluster was folded.
pub fn consolidate(
    clusters: BTreeMap<String, SystemCluster>,
    policy: &ClusterPolicy,
    observer: &dyn Observer,
) -> BTreeMap<String, SystemCluster> {
    let mut ordered: Vec<SystemCluster> = clusters.into_values().collect();
    ordered.sort_by(|a, b| {
        b.file_count()
            .cmp(&a.file_count())
            .then_with(|| a.key.cmp(&b.key))
    });

    let mut promoted: BTreeMap<String, SystemCluster> = BTreeMap::new();
    let mut other = SystemCluster::new(OTHER_SYSTEM);
    let mut folded_any = false;

    for cluster in ordered {
        let reason = if cluster.key == OTHER_SYSTEM {
            Some(FoldReason::Reserved)
        } else if cluster.file_count() < policy.min_system_files {
            Some(FoldReason::BelowMinimum)
        } else if promoted.len() >= policy.max_systems {
            Some(FoldReason::OverCap)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                observer.on_event(&Event::ClusterFolded {
                    key: &cluster.key,
                    file_count: cluster.file_count(),
                    reason,
                });
                folded_any = true;
                other.absorb(cluster);
            }
            None => {
                observer.on_event(&Event::ClusterPromoted {
                    key: &cluster.key,
                    file_count: cluster.file_count(),
                });
                promoted.insert(cluster.key.clone(), cluster);
            }
        }
    }

    if folded_any {
        promoted.insert(OTHER_SYSTEM.to_string(), other);
    }
    promoted
}
