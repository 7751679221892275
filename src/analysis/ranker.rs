use super::{ExclusionPolicy, MethodReference, Reference};
use crate::model::{JavaModel, MethodId};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Turns the unused remainder of a scan into the ranked method report
pub struct Ranker<'a> {
    policy: &'a ExclusionPolicy,
}

impl<'a> Ranker<'a> {
    pub fn new(policy: &'a ExclusionPolicy) -> Self {
        Self { policy }
    }

    /// Methods not in `used`, minus excluded ones, longest first.
    ///
    /// The sort is stable, so methods of equal length keep model order.
    pub fn rank(&self, model: &JavaModel, used: &HashSet<MethodId>) -> Vec<MethodReference> {
        let mut excluded = 0usize;

        let mut findings: Vec<MethodReference> = model
            .methods()
            .iter()
            .filter(|m| !used.contains(&m.id))
            .filter(|m| {
                let declaring = model.type_decl(m.declaring_type);
                match self.policy.method_exclusion(m, declaring) {
                    Some(reason) => {
                        trace!("Excluding {}#{}: {:?}", declaring.qualified_name, m.name, reason);
                        excluded += 1;
                        false
                    }
                    None => true,
                }
            })
            .map(|m| {
                let declaring = model.type_decl(m.declaring_type);
                MethodReference {
                    reference: Reference::new(declaring.qualified_name.clone())
                        .with_location(m.location.clone()),
                    method: m.name.clone(),
                    descriptor: m.descriptor(),
                    method_lines: m.line_count(),
                }
            })
            .collect();

        findings.sort_by(|a, b| b.method_lines.cmp(&a.method_lines));

        debug!(
            "{} unused methods reported, {} excluded",
            findings.len(),
            excluded
        );
        findings
    }
}
