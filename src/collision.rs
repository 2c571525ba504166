//! Pairwise collision resolution between two actor groups.
//!
//! The scan only marks; removal happens afterwards in one batch so neither
//! collection is restructured while it is being iterated.

use std::collections::HashSet;

use crate::actors::Destructible;
use crate::collaborators::Presentation;
use crate::entities::ActorId;

/// What one pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Intersecting pairs that exchanged damage.
    pub hits: usize,
    pub removed_attackers: usize,
    pub removed_defenders: usize,
}

/// Every live attacker against every live defender: on overlap both take one
/// unit of damage.  An entity destroyed mid-scan is skipped for the rest of
/// the pass; its damage already dealt stands.
pub fn handle_collisions<A, D>(
    attackers: &mut Vec<A>,
    defenders: &mut Vec<D>,
    presentation: &mut dyn Presentation,
) -> CollisionReport
where
    A: Destructible,
    D: Destructible,
{
    let mut report = CollisionReport::default();
    let mut destroyed_attackers: HashSet<ActorId> = HashSet::new();
    let mut destroyed_defenders: HashSet<ActorId> = HashSet::new();

    for attacker in attackers.iter_mut() {
        if attacker.is_destroyed() {
            continue;
        }
        for defender in defenders.iter_mut() {
            if attacker.is_destroyed() {
                break;
            }
            if defender.is_destroyed() {
                continue;
            }
            let (a, d) = (attacker.actor().bounds(), defender.actor().bounds());
            if !a.intersects(&d) {
                continue;
            }
            attacker.take_damage();
            defender.take_damage();
            report.hits += 1;
            if attacker.is_destroyed() {
                destroyed_attackers.insert(attacker.actor().id);
            }
            if defender.is_destroyed() {
                destroyed_defenders.insert(defender.actor().id);
            }
        }
    }

    report.removed_attackers = remove_marked(attackers, &destroyed_attackers, presentation);
    report.removed_defenders = remove_marked(defenders, &destroyed_defenders, presentation);
    report
}

fn remove_marked<T: Destructible>(
    actors: &mut Vec<T>,
    marked: &HashSet<ActorId>,
    presentation: &mut dyn Presentation,
) -> usize {
    if marked.is_empty() {
        return 0;
    }
    let before = actors.len();
    actors.retain(|a| {
        if marked.contains(&a.actor().id) {
            presentation.remove(a.actor());
            false
        } else {
            true
        }
    });
    before - actors.len()
}
