use crate::{String, Vec, format, vm::Instruction};
use core::ops::Deref;
use hashbrown::{HashMap, HashSet};

/// The lowered form of an expression: an ordered, jump-addressable list.
#[derive(Clone, PartialEq, Default)]
pub struct Instructions(Vec<Instruction>);

impl Instructions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.0.push(instruction);
    }

    pub fn append(&mut self, mut other: Instructions) {
        self.0.append(&mut other.0);
    }

    pub fn into_vec(self) -> Vec<Instruction> {
        self.0
    }

    /// Landing addresses of every jump, in address order.
    pub fn jump_targets(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(address, instruction)| instruction.jump_target(address))
            .collect()
    }
}

impl Deref for Instructions {
    type Target = [Instruction];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Instruction>> for Instructions {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self(instructions)
    }
}

impl FromIterator<Instruction> for Instructions {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Instruction> for Instructions {
    fn extend<I: IntoIterator<Item = Instruction>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Instructions {
    type Item = Instruction;
    type IntoIter = alloc::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl core::fmt::Debug for Instructions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // First pass: collect all jump targets to determine which addresses need labels
        let jump_targets: HashSet<usize> = self.jump_targets().into_iter().collect();

        // Assign label numbers to targets (sorted for deterministic output)
        let mut sorted_targets: Vec<_> = jump_targets.into_iter().collect();
        sorted_targets.sort();
        let label_map: HashMap<usize, usize> = sorted_targets
            .into_iter()
            .enumerate()
            .map(|(i, address)| (address, i))
            .collect();

        writeln!(f, "Instructions {{")?;
        for (address, instruction) in self.0.iter().enumerate() {
            let label_prefix = match label_map.get(&address) {
                Some(label) => format!("L{}:", label),
                None => String::new(),
            };

            match instruction.jump_target(address) {
                Some(target) => {
                    let target_label = label_map
                        .get(&target)
                        .map(|l| format!("L{}", l))
                        .unwrap_or_else(|| format!("@{}", target));
                    writeln!(
                        f,
                        "    {:4} {:>4}  {:?} (to {})",
                        address, label_prefix, instruction, target_label
                    )?;
                }
                None => writeln!(f, "    {:4} {:>4}  {:?}", address, label_prefix, instruction)?,
            }
        }
        write!(f, "}}")
    }
}
