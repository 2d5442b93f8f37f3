//! Target generation - synthetic filesystem plus defense profile.
//!
//! A target is generated once per mission assignment and is immutable from
//! the moment an attempt begins. Shape scales with the difficulty tier:
//! deeper trees, stronger defenses, and an objective file buried at the
//! bottom of the tree.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use netrun_logic::constants::MAX_TIER;
use netrun_logic::defense::{strength_range, DefenseKind, DefenseLayer};

use super::names;
use super::rng::derive_stream;
use crate::error::GenerationError;

/// A file or directory in a target's synthetic filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileNode {
    Directory {
        name: String,
        children: Vec<FileNode>,
    },
    File {
        name: String,
        /// 0-100; the objective file is always 100.
        sensitivity: u8,
        /// Opaque reference to the file's content blob.
        payload: String,
        objective: bool,
    },
}

impl FileNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } => name,
            Self::File { name, .. } => name,
        }
    }

    /// Directory nesting depth below (and including) this node.
    /// Files count zero.
    pub fn max_depth(&self) -> u32 {
        match self {
            Self::File { .. } => 0,
            Self::Directory { children, .. } => {
                1 + children.iter().map(FileNode::max_depth).max().unwrap_or(0)
            }
        }
    }

    pub fn file_count(&self) -> usize {
        match self {
            Self::File { .. } => 1,
            Self::Directory { children, .. } => children.iter().map(FileNode::file_count).sum(),
        }
    }

    fn count_objectives(&self) -> usize {
        match self {
            Self::File { objective, .. } => usize::from(*objective),
            Self::Directory { children, .. } => {
                children.iter().map(FileNode::count_objectives).sum()
            }
        }
    }
}

/// A generated target system. Owned by the session attacking it and
/// discarded when the mission resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub tier: u8,
    /// Ordered front to back; later layers are never weaker.
    pub defenses: Vec<DefenseLayer>,
    pub root: FileNode,
    /// Names from the root's children down to the objective file.
    pub objective_path: Vec<String>,
}

impl Target {
    /// Walk a path of names from the root. Empty path yields the root.
    pub fn resolve(&self, path: &[String]) -> Option<&FileNode> {
        let mut node = &self.root;
        for name in path {
            match node {
                FileNode::Directory { children, .. } => {
                    node = children.iter().find(|c| c.name() == name)?;
                }
                FileNode::File { .. } => return None,
            }
        }
        Some(node)
    }

    /// Payload reference of the objective file.
    pub fn objective_payload(&self) -> Option<String> {
        match self.resolve(&self.objective_path)? {
            FileNode::File { payload, .. } => Some(payload.clone()),
            FileNode::Directory { .. } => None,
        }
    }
}

/// Directory levels below the root for a tier.
pub fn tree_depth(tier: u8) -> u32 {
    2 + tier as u32 / 2
}

/// Generate a target. Deterministic: identical `(target_id, tier, seed)`
/// yield byte-identical targets.
pub fn generate(target_id: &str, tier: u8, seed: u64) -> Result<Target, GenerationError> {
    if tier < 1 || tier > MAX_TIER {
        return Err(GenerationError::TierOutOfRange {
            tier,
            max_tier: MAX_TIER,
        });
    }

    let mut rng = derive_stream(seed, target_id, tier);

    // Draw order is part of the format: defenses first, then the tree,
    // then objective placement.
    let defenses = generate_defenses(tier, &mut rng);
    let children = generate_level(&mut rng, tier, tree_depth(tier));
    let mut root = FileNode::Directory {
        name: "/".to_string(),
        children,
    };

    let mut objective_path = Vec::new();
    place_objective(&mut root, target_id, &mut rng, &mut objective_path);

    debug!(
        "generated target {target_id} tier {tier}: {} files, objective at /{}",
        root.file_count(),
        objective_path.join("/")
    );

    Ok(Target {
        id: target_id.to_string(),
        tier,
        defenses,
        root,
        objective_path,
    })
}

fn generate_defenses(tier: u8, rng: &mut impl Rng) -> Vec<DefenseLayer> {
    let (lo, hi) = strength_range(tier);
    let mut floor = 0;
    DefenseKind::ordered()
        .into_iter()
        .map(|kind| {
            // Running max keeps later layers at least as strong as earlier ones
            let strength = rng.gen_range(lo..=hi).max(floor);
            floor = strength;
            DefenseLayer { kind, strength }
        })
        .collect()
}

fn generate_level(rng: &mut impl Rng, tier: u8, depth_remaining: u32) -> Vec<FileNode> {
    let mut children = Vec::new();

    let file_count = rng.gen_range(2..=4);
    for index in 0..file_count {
        let name = names::file_name(rng, index);
        let sensitivity = ((tier as u32 * 4) + rng.gen_range(10..=60)).min(100) as u8;
        let payload = format!("blob:{:08x}", rng.gen::<u32>());
        children.push(FileNode::File {
            name,
            sensitivity,
            payload,
            objective: false,
        });
    }

    if depth_remaining > 0 {
        let dir_count = rng.gen_range(2..5);
        for index in 0..dir_count {
            let name = names::directory_name(rng, index);
            children.push(FileNode::Directory {
                name,
                children: generate_level(rng, tier, depth_remaining - 1),
            });
        }
    }

    children
}

/// Descend random subdirectories to the bottom of the tree and promote
/// one file there to the objective.
fn place_objective(
    node: &mut FileNode,
    target_id: &str,
    rng: &mut impl Rng,
    path: &mut Vec<String>,
) {
    let children = match node {
        FileNode::Directory { children, .. } => children,
        FileNode::File { .. } => return,
    };

    let dirs: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, FileNode::Directory { .. }))
        .map(|(i, _)| i)
        .collect();

    if dirs.is_empty() {
        let files: Vec<usize> = children
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, FileNode::File { .. }))
            .map(|(i, _)| i)
            .collect();
        // Every generated directory holds at least two files
        let pick = files[rng.gen_range(0..files.len())];
        if let FileNode::File {
            name,
            sensitivity,
            payload,
            objective,
        } = &mut children[pick]
        {
            *objective = true;
            *sensitivity = 100;
            *payload = format!("objective://{target_id}/{name}");
            path.push(name.clone());
        }
        return;
    }

    let pick = dirs[rng.gen_range(0..dirs.len())];
    path.push(children[pick].name().to_string());
    place_objective(&mut children[pick], target_id, rng, path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_all_tiers() {
        for tier in 1..=MAX_TIER {
            let a = generate("neuronet", tier, 42).unwrap();
            let b = generate("neuronet", tier, 42).unwrap();
            assert_eq!(
                bincode::serialize(&a).unwrap(),
                bincode::serialize(&b).unwrap(),
                "tier {tier} targets differ"
            );
        }
    }

    #[test]
    fn seed_changes_target() {
        let a = generate("neuronet", 3, 42).unwrap();
        let b = generate("neuronet", 3, 43).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tier_out_of_range_rejected() {
        assert_eq!(
            generate("neuronet", 0, 42),
            Err(GenerationError::TierOutOfRange {
                tier: 0,
                max_tier: MAX_TIER
            })
        );
        assert!(generate("neuronet", MAX_TIER + 1, 42).is_err());
    }

    #[test]
    fn defenses_ordered_and_escalating() {
        for tier in 1..=MAX_TIER {
            let target = generate("cybercorp", tier, 7).unwrap();
            assert_eq!(target.defenses.len(), 3);
            assert_eq!(target.defenses[0].kind, DefenseKind::Firewall);
            assert_eq!(target.defenses[1].kind, DefenseKind::IntrusionDetection);
            assert_eq!(target.defenses[2].kind, DefenseKind::Encryption);

            let (lo, hi) = strength_range(tier);
            for pair in target.defenses.windows(2) {
                assert!(pair[0].strength <= pair[1].strength);
            }
            for layer in &target.defenses {
                assert!(layer.strength >= lo && layer.strength <= hi);
            }
        }
    }

    #[test]
    fn depth_scales_with_tier() {
        for tier in 1..=MAX_TIER {
            let target = generate("datadyn", tier, 9).unwrap();
            assert_eq!(target.root.max_depth(), tree_depth(tier) + 1);
        }
        assert!(tree_depth(10) > tree_depth(1));
    }

    #[test]
    fn objective_buried_at_full_depth() {
        for tier in [1, 5, MAX_TIER] {
            let target = generate("techtron", tier, 11).unwrap();
            assert_eq!(target.root.count_objectives(), 1);
            assert_eq!(
                target.objective_path.len() as u32,
                tree_depth(tier) + 1,
                "objective not at the bottom for tier {tier}"
            );
            match target.resolve(&target.objective_path) {
                Some(FileNode::File {
                    sensitivity,
                    objective,
                    payload,
                    ..
                }) => {
                    assert!(*objective);
                    assert_eq!(*sensitivity, 100);
                    assert!(payload.starts_with("objective://techtron/"));
                }
                other => panic!("objective path did not resolve to a file: {other:?}"),
            }
        }
    }

    #[test]
    fn resolve_rejects_bogus_paths() {
        let target = generate("netsphere", 2, 3).unwrap();
        assert!(target.resolve(&["nope".to_string()]).is_none());
        assert!(target.resolve(&[]).is_some());
    }
}
