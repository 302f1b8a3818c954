//! Swept collision resolution for a single move
//!
//! `CollisionWorld` is a read-only view over the sprite store, the spatial
//! index and the response policy. It computes where a sprite ends up and which
//! contacts it made; committing the result is up to the caller.
//!
//! Resolution runs in passes. Each pass sweeps the sprite's collide rect along
//! the current segment, sorts the contacts by `(t, id)` and applies responses
//! in that order. Slide and Bounce redirect the rest of the displacement from
//! the touch point and start a new pass; Freeze ends the move. The obstacle a
//! pass was redirected off is skipped only by the pass that leaves it, so a
//! bounce back across the segment still hits it. Sprites passed through with
//! Overlap are reported once per move.

use super::event::{CollisionEvent, MoveOutcome};
use super::response::{CollisionResponse, ResponsePolicy};
use super::sweep::{sweep_rects, Contact};
use crate::error::SpriteResult;
use crate::foundation::math::{Rect, Vec2};
use crate::spatial::SpatialIndex;
use crate::sprite::{Sprite, SpriteId, SpriteStore};

/// Read-only collision context for one world
pub struct CollisionWorld<'a> {
    store: &'a SpriteStore,
    index: &'a dyn SpatialIndex,
    policy: &'a ResponsePolicy,
    max_passes: u32,
}

/// What a pass decided
enum PassEnd {
    /// No blocking contact; the segment was travelled in full
    Clear,
    /// Frozen at a collide-rect origin
    Stopped(Vec2),
    /// Redirected off `from` at `origin` by `rest`, starting at global time `time`
    Redirected {
        from: SpriteId,
        origin: Vec2,
        rest: Vec2,
        time: f32,
    },
}

/// Sprites a pass leaves out
struct Skip<'s> {
    /// The mover and everything it already passed through
    passed: &'s [SpriteId],
    /// The obstacle the pass starts from
    resting: Option<SpriteId>,
}

impl Skip<'_> {
    fn contains(&self, id: SpriteId) -> bool {
        self.resting == Some(id) || self.passed.contains(&id)
    }
}

impl<'a> CollisionWorld<'a> {
    /// Bind a collision context; `max_passes` is raised to at least one
    pub fn new(
        store: &'a SpriteStore,
        index: &'a dyn SpatialIndex,
        policy: &'a ResponsePolicy,
        max_passes: u32,
    ) -> Self {
        Self {
            store,
            index,
            policy,
            max_passes: max_passes.max(1),
        }
    }

    /// Resolve moving `id` from its current position towards `goal`
    pub fn resolve(&self, id: SpriteId, goal: Vec2) -> SpriteResult<MoveOutcome> {
        let sprite = self.store.get(id)?;
        if !sprite.participates_in_collisions() {
            return Ok(MoveOutcome::unobstructed(goal));
        }

        let start = sprite.position();
        let displacement = goal - start;
        let start_rect = sprite.world_collide_rect();
        // Sprite position relative to the collide-rect origin; fixed for the whole move
        let anchor = start - start_rect.origin();

        let mut passed = vec![id];
        let mut resting = None;
        let mut events = Vec::new();
        let mut origin = start_rect.origin();
        let mut target = origin + displacement;
        let mut time = 0.0_f32;
        let mut passes = 0;

        let end = loop {
            passes += 1;
            let moving = start_rect.with_origin(origin);
            let skip = Skip {
                passed: &passed,
                resting,
            };
            let reported = events.len();
            let pass_end = self.run_pass(sprite, &moving, target, time, anchor, &skip, &mut events);
            passed.extend(
                events[reported..]
                    .iter()
                    .filter(|event| event.response == CollisionResponse::Overlap)
                    .map(|event| event.other),
            );

            match pass_end {
                PassEnd::Clear => break None,
                PassEnd::Stopped(at) => break Some(at),
                PassEnd::Redirected { .. } if displacement == Vec2::zeros() => break None,
                PassEnd::Redirected { origin: touch, rest, .. } if rest == Vec2::zeros() => break Some(touch),
                PassEnd::Redirected {
                    from,
                    origin: touch,
                    rest,
                    time: resumed,
                } => {
                    if passes >= self.max_passes {
                        log::debug!(
                            "{id:?} exhausted {} resolution passes, dropping {rest:?}",
                            self.max_passes
                        );
                        break Some(touch);
                    }
                    origin = touch;
                    target = touch + rest;
                    time = resumed;
                    resting = Some(from);
                }
            }
        };

        let actual = if displacement == Vec2::zeros() {
            start
        } else {
            match end {
                None if passes == 1 => goal,
                None => target + anchor,
                Some(at) => at + anchor,
            }
        };

        events.sort_by(|a, b| a.ti.total_cmp(&b.ti).then(a.other.cmp(&b.other)));
        Ok(MoveOutcome { actual, events })
    }

    fn run_pass(
        &self,
        sprite: &Sprite,
        moving: &Rect,
        target: Vec2,
        time: f32,
        anchor: Vec2,
        skip: &Skip<'_>,
        events: &mut Vec<CollisionEvent>,
    ) -> PassEnd {
        let delta = target - moving.origin();
        let contacts = self.contacts(moving, delta, skip);

        for (contact, other) in contacts {
            let response = self.policy.resolve(sprite, other);
            let ti = (time + contact.t * (1.0 - time)).clamp(0.0, 1.0);
            // No push-out is applied when passing through or standing still
            let stays = response == CollisionResponse::Overlap || delta == Vec2::zeros();
            let touch = if contact.overlaps && stays {
                moving.origin() + anchor
            } else {
                contact.touch + anchor
            };
            let movement = touch - sprite.position();

            log::trace!(
                "{:?} touched {:?} at ti={ti:.3} ({response:?}, overlaps={})",
                sprite.id(),
                other.id(),
                contact.overlaps
            );

            events.push(CollisionEvent {
                sprite: sprite.id(),
                other: other.id(),
                response,
                overlaps: contact.overlaps,
                ti,
                movement,
                normal: contact.normal,
                touch,
                sprite_rect: sprite.bounds().translated(movement),
                other_rect: other.bounds(),
            });

            match response {
                CollisionResponse::Overlap => {}
                CollisionResponse::Freeze => return PassEnd::Stopped(contact.touch),
                CollisionResponse::Slide | CollisionResponse::Bounce => {
                    let mut rest = target - contact.touch;
                    let factor = if response == CollisionResponse::Slide { 0.0 } else { -1.0 };
                    if contact.normal.is_horizontal() {
                        rest.x *= factor;
                    }
                    if contact.normal.is_vertical() {
                        rest.y *= factor;
                    }
                    return PassEnd::Redirected {
                        from: other.id(),
                        origin: contact.touch,
                        rest,
                        time: ti,
                    };
                }
            }
        }

        PassEnd::Clear
    }

    /// Contacts along `moving + delta`, ordered by `(t, id)`
    fn contacts(&self, moving: &Rect, delta: Vec2, skip: &Skip<'_>) -> Vec<(Contact, &'a Sprite)> {
        let region = moving.bounding(&moving.translated(delta));
        let mut contacts: Vec<(Contact, &'a Sprite)> = self
            .index
            .candidates_for_region(region)
            .into_iter()
            .filter(|candidate| !skip.contains(*candidate))
            .filter_map(|candidate| self.store.get(candidate).ok())
            .filter(|other| other.participates_in_collisions())
            .filter_map(|other| {
                sweep_rects(moving, delta, &other.world_collide_rect()).map(|contact| (contact, other))
            })
            .collect();

        contacts.sort_by(|(a, sa), (b, sb)| {
            a.t.total_cmp(&b.t).then(sa.id().cmp(&sb.id()))
        });
        contacts
    }
}
