//! Grouped child thinning.
//!
//! Children of a stem are split into groups (16 children per group above 64
//! children, 4 otherwise), sized as evenly as the child count allows. The
//! survivors are shared out between the groups: every group keeps the same
//! number of its first children and the remainder goes one extra child per
//! group, spaced evenly along the stem. Survivors are therefore spread along
//! the stem instead of clustering at its base.
//!
//! The highest surviving child is the transition child: it carries the
//! fractional part of `child_count * density` as its scale, so the summed
//! scale tracks the continuous density. Child 0 always survives at scale 1.
//!
//! Two views of the same selection are provided: [`nth_child`] enumerates
//! survivors in order and [`child_scale_from_index`] scores a given child.

/// Group size used for `child_count` children.
pub fn group_size(child_count: u32) -> u32 {
    if child_count > 64 { 16 } else { 4 }
}

/// Number of children kept at `density`.
///
/// # Examples
/// ```
/// use sylvan::lod::density::alive_child_count;
///
/// assert_eq!(alive_child_count(10, 1.0), 10);
/// assert_eq!(alive_child_count(10, 0.5), 5);
/// assert_eq!(alive_child_count(10, 0.01), 1);
/// ```
pub fn alive_child_count(child_count: u32, density: f32) -> u32 {
    (child_count as f32 * density).ceil().max(0.0) as u32
}

/// Survivor layout for one `(child_count, density)` pair.
struct Selection {
    group_count: u32,
    small_groups: u32,
    small_group_len: u32,
    alive: u32,
    per_group: u32,
    extra: u32,
    first_extra_group: u32,
    extra_groups: u32,
    transition_scale: f32,
}

impl Selection {
    fn new(child_count: u32, density: f32) -> Option<Self> {
        if child_count == 0 {
            return None;
        }

        let group_count = child_count.div_ceil(group_size(child_count));
        let small_group_len = child_count / group_count;
        let large_groups = child_count % group_count;

        let alive = alive_child_count(child_count, density).clamp(1, child_count);
        let per_group = alive / group_count;
        let extra = alive % group_count;

        // Only groups with room for one more child can take an extra one
        let (first_extra_group, extra_groups) = if per_group < small_group_len {
            (0, group_count)
        } else {
            (group_count - large_groups, large_groups)
        };

        let transition_scale =
            (child_count as f32 * density - (alive - 1) as f32).clamp(f32::MIN_POSITIVE, 1.0);

        Some(Self {
            group_count,
            small_groups: group_count - large_groups,
            small_group_len,
            alive,
            per_group,
            extra,
            first_extra_group,
            extra_groups,
            transition_scale,
        })
    }

    fn group_start(&self, group: u32) -> u32 {
        group * self.small_group_len + group.saturating_sub(self.small_groups)
    }

    fn group_of(&self, child_index: u32) -> u32 {
        let small_span = self.small_groups * self.small_group_len;
        if child_index < small_span {
            child_index / self.small_group_len
        } else {
            self.small_groups + (child_index - small_span) / (self.small_group_len + 1)
        }
    }

    /// Whether `group` holds one of the `extra` leftover survivors.
    fn has_extra(&self, group: u32) -> bool {
        if self.extra == 0 || group < self.first_extra_group {
            return false;
        }
        let slot = (group - self.first_extra_group) as u64;
        let (extra, groups) = (self.extra as u64, self.extra_groups as u64);
        if slot >= groups {
            return false;
        }
        if self.per_group == 0 {
            // Start at the base so child 0 survives
            ((slot + 1) * extra).div_ceil(groups) > (slot * extra).div_ceil(groups)
        } else {
            (slot + 1) * extra / groups > slot * extra / groups
        }
    }

    fn kept(&self, group: u32) -> u32 {
        self.per_group + self.has_extra(group) as u32
    }

    fn last_alive(&self) -> u32 {
        (0..self.group_count)
            .rev()
            .find_map(|group| {
                let kept = self.kept(group);
                (kept > 0).then(|| self.group_start(group) + kept - 1)
            })
            .unwrap_or(0)
    }

    fn scale(&self, child_index: u32) -> f32 {
        if child_index != 0 && child_index == self.last_alive() {
            self.transition_scale
        } else {
            1.0
        }
    }
}

/// Scale of child `child_index` out of `child_count` at `density`; 0 means culled.
pub fn child_scale_from_index(child_index: u32, child_count: u32, density: f32) -> f32 {
    let Some(selection) = Selection::new(child_count, density) else {
        return 0.0;
    };
    if child_index >= child_count {
        return 0.0;
    }

    let group = selection.group_of(child_index);
    if child_index - selection.group_start(group) >= selection.kept(group) {
        return 0.0;
    }
    selection.scale(child_index)
}

/// Original index and scale of the `n`-th surviving child.
///
/// Survivors come out in increasing child index. Returns `(0, 0.0)` once `n`
/// runs past the survivors. The first survivor is always child 0 at scale 1.
pub fn nth_child(n: u32, child_count: u32, density: f32) -> (u32, f32) {
    let Some(selection) = Selection::new(child_count, density) else {
        return (0, 0.0);
    };
    if n >= selection.alive {
        return (0, 0.0);
    }

    let mut skipped = 0;
    for group in 0..selection.group_count {
        let kept = selection.kept(group);
        if n < skipped + kept {
            let child_index = selection.group_start(group) + (n - skipped);
            return (child_index, selection.scale(child_index));
        }
        skipped += kept;
    }
    (0, 0.0)
}
