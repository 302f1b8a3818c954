//! Scenario tests for the sprite world

use super::*;
use crate::config::{ConfigError, WorldConfig};
use crate::error::SpriteError;
use crate::foundation::logging;
use crate::foundation::math::{CollisionNormal, Rect, Vec2};
use crate::physics::{constant_response, CollisionResponse};
use crate::render::{draw_fn, SpriteRenderer};
use crate::sprite::{ImageFlip, ImageHandle, Sprite, SpriteId, UserData};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Recorder {
    calls: Vec<(SpriteId, Rect, Rect)>,
}

impl SpriteRenderer for Recorder {
    fn draw_sprite(&mut self, sprite: &Sprite, bounds: Rect, draw_rect: Rect) {
        self.calls.push((sprite.id(), bounds, draw_rect));
    }
}

fn sprite_at(world: &mut SpriteWorld, bounds: Rect) -> SpriteId {
    let id = world.create_sprite();
    world.set_bounds(id, bounds).unwrap();
    id
}

#[test]
fn test_new_sprite_defaults() {
    let mut world = SpriteWorld::new();
    let id = world.create_sprite();
    let sprite = world.sprite(id).unwrap();

    assert_eq!(sprite.bounds(), Rect::zero());
    assert!(!sprite.has_collide_rect());
    assert_eq!(sprite.z_index(), 0);
    assert!(sprite.is_visible() && sprite.collisions_enabled() && sprite.updates_enabled());
    assert!(!sprite.is_opaque());
    assert_eq!(sprite.tag(), 0);
    assert_eq!(sprite.userdata(), None);
    assert_eq!(sprite.center(), Vec2::zeros());
}

#[test]
fn test_freeze_example_scenario() {
    logging::init_for_tests();
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(15.0, 0.0, 10.0, 10.0));
    world
        .set_collision_response_fn(a, Some(constant_response(CollisionResponse::Freeze)))
        .unwrap();

    let outcome = world.move_with_collisions(a, Vec2::new(20.0, 0.0)).unwrap();

    assert_eq!(outcome.events.len(), 1);
    let event = &outcome.events[0];
    assert_eq!(event.sprite, a);
    assert_eq!(event.other, b);
    assert!(!event.overlaps);
    assert_eq!(event.normal, CollisionNormal::new(-1, 0));
    assert_relative_eq!(event.ti, 0.25);
    assert_relative_eq!(outcome.actual.x, 5.0);
    assert_relative_eq!(outcome.actual.y, 0.0);
    assert_abs_diff_eq!(world.bounds(a).unwrap(), Rect::new(5.0, 0.0, 10.0, 10.0));
}

#[test]
fn test_freeze_stops_at_leading_edge() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let wall = sprite_at(&mut world, Rect::new(30.0, -5.0, 10.0, 20.0));

    world.move_with_collisions(a, Vec2::new(50.0, 0.0)).unwrap();
    assert_relative_eq!(world.bounds(a).unwrap().right(), world.bounds(wall).unwrap().x);
}

#[test]
fn test_slide_keeps_perpendicular_displacement() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(20.0, -100.0, 10.0, 300.0));
    world.set_default_collision_response(Some(constant_response(CollisionResponse::Slide)));

    let outcome = world.move_with_collisions(a, Vec2::new(30.0, 25.0)).unwrap();
    assert_relative_eq!(outcome.actual.x, 10.0, epsilon = 1e-4);
    assert_relative_eq!(outcome.actual.y, 25.0, epsilon = 1e-4);
    assert_eq!(outcome.events[0].response, CollisionResponse::Slide);
}

#[test]
fn test_events_sorted_and_in_unit_range() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let far = sprite_at(&mut world, Rect::new(60.0, 0.0, 10.0, 10.0));
    let near = sprite_at(&mut world, Rect::new(20.0, 0.0, 10.0, 10.0));
    let mid = sprite_at(&mut world, Rect::new(40.0, 0.0, 10.0, 10.0));
    world.set_default_collision_response(Some(constant_response(CollisionResponse::Overlap)));

    let outcome = world.move_with_collisions(a, Vec2::new(100.0, 0.0)).unwrap();
    let order: Vec<SpriteId> = outcome.events.iter().map(|e| e.other).collect();
    assert_eq!(order, vec![near, mid, far]);
    for pair in outcome.events.windows(2) {
        assert!(pair[0].ti <= pair[1].ti);
    }
    assert!(outcome.events.iter().all(|e| (0.0..=1.0).contains(&e.ti)));
    assert_eq!(outcome.actual, Vec2::new(100.0, 0.0));
}

#[test]
fn test_inert_movers_reach_goal() {
    let mut world = SpriteWorld::new();
    let disabled = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let flat = sprite_at(&mut world, Rect::new(0.0, 20.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(15.0, 0.0, 10.0, 40.0));
    world.set_collisions_enabled(disabled, false).unwrap();
    world.set_collide_rect(flat, Rect::new(0.0, 0.0, 10.0, 0.0)).unwrap();

    for id in [disabled, flat] {
        let goal = world.position(id).unwrap() + Vec2::new(40.0, 0.0);
        let outcome = world.move_with_collisions(id, goal).unwrap();
        assert_eq!(outcome.actual, goal);
        assert!(outcome.events.is_empty());
        assert_eq!(world.position(id).unwrap(), goal);
    }
}

#[test]
fn test_negative_sizes_are_clamped_and_inert() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, -5.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(-20.0, 0.0, 10.0, 10.0));
    assert_eq!(world.bounds(a).unwrap().width, 0.0);

    let outcome = world.move_with_collisions(b, Vec2::new(20.0, 0.0)).unwrap();
    assert!(outcome.events.is_empty());
    assert!(world.sprites_at_point(Vec2::new(0.0, 5.0)).iter().all(|id| *id != a));
}

#[test]
fn test_unobstructed_move_reaches_goal() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(0.0, 50.0, 10.0, 10.0));

    let outcome = world.move_with_collisions(a, Vec2::new(80.0, 20.0)).unwrap();
    assert_eq!(outcome.actual, Vec2::new(80.0, 20.0));
    assert!(!outcome.collided());
}

#[test]
fn test_check_collisions_is_pure_and_repeatable() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(25.0, 4.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(12.0, -9.0, 4.0, 4.0));
    world.drain_dirty_rects();

    let first = world.check_collisions(a, Vec2::new(40.0, 3.0)).unwrap();
    let second = world.check_collisions(a, Vec2::new(40.0, 3.0)).unwrap();
    assert_eq!(first, second);
    assert_eq!(world.position(a).unwrap(), Vec2::zeros());
    assert!(world.dirty_rects().is_empty());
}

#[test]
fn test_overlapping_pair_reports_without_moving() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    world.set_default_collision_response(Some(constant_response(CollisionResponse::Overlap)));

    for (id, other) in [(a, b), (b, a)] {
        let outcome = world.check_collisions(id, Vec2::zeros()).unwrap();
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].other, other);
        assert!(outcome.events[0].overlaps);
        assert_eq!(outcome.events[0].ti, 0.0);
        assert_eq!(outcome.actual, Vec2::zeros());
    }
    assert_eq!(world.overlapping_sprites(a).unwrap(), vec![b]);
    assert_eq!(world.all_overlapping_pairs().len(), 1);
}

#[test]
fn test_rect_query_matches_positive_area_overlap() {
    let mut world = SpriteWorld::new();
    let s1 = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let s2 = sprite_at(&mut world, Rect::new(10.0, 0.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(5.0, 5.0, 0.0, 10.0));
    let s4 = sprite_at(&mut world, Rect::new(100.0, 100.0, 5.0, 5.0));

    assert_eq!(world.sprites_in_rect(Rect::new(5.0, 0.0, 10.0, 5.0)), vec![s1, s2]);
    assert_eq!(world.sprites_in_rect(Rect::new(20.0, 0.0, 5.0, 5.0)), Vec::<SpriteId>::new());
    assert_eq!(
        world.sprites_in_rect(Rect::new(-1.0e6, -1.0e6, 2.0e6, 2.0e6)),
        vec![s1, s2, s4]
    );
    assert!(world.sprites_in_rect(Rect::new(5.0, 5.0, 0.0, 0.0)).is_empty());
}

#[test]
fn test_line_query_through_world() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(10.0, 0.0, 10.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(30.0, 0.0, 10.0, 10.0));

    assert_eq!(world.sprites_along_line(Vec2::new(50.0, 5.0), Vec2::new(0.0, 5.0)), vec![b, a]);
    let hits = world.sprite_info_along_line(Vec2::new(0.0, 5.0), Vec2::new(50.0, 5.0));
    assert_relative_eq!(hits[1].ti1, 0.6);
    assert_relative_eq!(hits[1].exit_point.x, 40.0);
}

#[test]
fn test_index_follows_moves_and_removals() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));

    world.move_to(a, Vec2::new(100.0, 100.0)).unwrap();
    assert!(world.sprites_at_point(Vec2::new(5.0, 5.0)).is_empty());
    assert_eq!(world.sprites_at_point(Vec2::new(105.0, 105.0)), vec![a]);

    world.move_by(a, Vec2::new(-50.0, 0.0)).unwrap();
    assert_eq!(world.sprites_at_point(Vec2::new(55.0, 105.0)), vec![a]);

    world.remove_sprite(a).unwrap();
    assert!(world.sprites_at_point(Vec2::new(55.0, 105.0)).is_empty());
    assert!(matches!(world.bounds(a), Err(SpriteError::InvalidHandle(id)) if id == a));
}

#[test]
fn test_reset_world_invalidates_everything() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    sprite_at(&mut world, Rect::new(2.0, 2.0, 10.0, 10.0));
    let hidden = sprite_at(&mut world, Rect::new(100.0, 100.0, 10.0, 10.0));
    world.set_visible(hidden, false).unwrap();
    world.drain_dirty_rects();

    world.reset_world();
    assert_eq!(world.sprite_count(), 0);
    assert!(world.sprites_at_point(Vec2::new(5.0, 5.0)).is_empty());
    assert!(!world.contains(a));

    // The vacated areas of visible sprites still need repainting
    assert_eq!(
        world.drain_dirty_rects(),
        vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(2.0, 2.0, 10.0, 10.0)]
    );
    assert!(world.set_bounds(a, Rect::new(0.0, 0.0, 1.0, 1.0)).is_err());

    // Slots are reused, but old handles stay dead
    let fresh = world.create_sprite();
    assert_ne!(fresh, a);
    assert!(world.position(a).is_err());
}

#[test]
fn test_remove_sprites_is_all_or_nothing() {
    let mut world = SpriteWorld::new();
    let a = world.create_sprite();
    let b = world.create_sprite();
    world.remove_sprite(a).unwrap();

    assert!(matches!(world.remove_sprites(&[b, a]), Err(SpriteError::InvalidHandle(_))));
    assert!(world.contains(b));

    world.remove_sprites(&[b, b]).unwrap();
    assert_eq!(world.sprite_count(), 0);
}

#[test]
fn test_z_order_drives_iteration() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let c = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    world.set_z_index(a, 2).unwrap();
    world.set_z_index(c, -1).unwrap();

    let order: Vec<SpriteId> = world.sprites().map(Sprite::id).collect();
    assert_eq!(order, vec![c, b, a]);
    assert_eq!(world.sprites_at_point(Vec2::new(1.0, 1.0)), vec![c, b, a]);
}

#[test]
fn test_center_and_size_keep_position() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));

    world.set_center(a, Vec2::new(0.5, 0.5)).unwrap();
    assert_eq!(world.position(a).unwrap(), Vec2::zeros());
    assert_eq!(world.bounds(a).unwrap(), Rect::new(-5.0, -5.0, 10.0, 10.0));

    world.set_size(a, 20.0, 20.0).unwrap();
    assert_eq!(world.bounds(a).unwrap(), Rect::new(-10.0, -10.0, 20.0, 20.0));

    world.move_to(a, Vec2::new(50.0, 50.0)).unwrap();
    assert_eq!(world.bounds(a).unwrap(), Rect::new(40.0, 40.0, 20.0, 20.0));
}

#[test]
fn test_centered_sprite_collides_in_position_space() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    world.set_center(a, Vec2::new(0.5, 0.5)).unwrap();
    sprite_at(&mut world, Rect::new(20.0, -5.0, 10.0, 10.0));

    // Bounds span x -5..5; the right edge meets the wall after 15 units
    let outcome = world.move_with_collisions(a, Vec2::new(40.0, 0.0)).unwrap();
    assert_relative_eq!(outcome.actual.x, 15.0);
    assert_relative_eq!(outcome.events[0].touch.x, 15.0);
    assert_relative_eq!(world.bounds(a).unwrap().right(), 20.0);
}

#[test]
fn test_collide_rect_is_local_to_bounds() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(100.0, 100.0, 20.0, 20.0));
    world.set_collide_rect(a, Rect::new(5.0, 5.0, 10.0, 10.0)).unwrap();
    assert_eq!(world.world_collide_rect(a).unwrap(), Rect::new(105.0, 105.0, 10.0, 10.0));

    world.clear_collide_rect(a).unwrap();
    assert_eq!(world.collide_rect(a).unwrap(), Rect::new(0.0, 0.0, 20.0, 20.0));
}

#[test]
fn test_copy_sprite_duplicates_data_and_hooks() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(5.0, 5.0, 10.0, 10.0));
    world.set_tag(a, 7).unwrap();
    world.set_userdata(a, Some(UserData(42))).unwrap();
    world
        .set_update_fn(a, Some(update_fn(|sprite| SpriteUpdate::MoveTo(sprite.position() + Vec2::new(1.0, 0.0)))))
        .unwrap();

    let copy = world.copy_sprite(a).unwrap();
    assert_ne!(copy, a);
    assert_eq!(world.bounds(copy).unwrap(), Rect::new(5.0, 5.0, 10.0, 10.0));
    assert_eq!(world.tag(copy).unwrap(), 7);
    assert_eq!(world.userdata(copy).unwrap(), Some(UserData(42)));

    world.update_sprites().unwrap();
    assert_eq!(world.position(a).unwrap(), Vec2::new(6.0, 5.0));
    assert_eq!(world.position(copy).unwrap(), Vec2::new(6.0, 5.0));
}

#[test]
fn test_update_hooks_drive_movement() {
    let mut world = SpriteWorld::new();
    let mover = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let idle = sprite_at(&mut world, Rect::new(0.0, 50.0, 10.0, 10.0));
    let wall = sprite_at(&mut world, Rect::new(30.0, 0.0, 10.0, 10.0));

    world
        .set_update_fn(
            mover,
            Some(update_fn(|sprite| {
                SpriteUpdate::MoveWithCollisions(sprite.position() + Vec2::new(40.0, 0.0))
            })),
        )
        .unwrap();
    world
        .set_update_fn(idle, Some(update_fn(|_| SpriteUpdate::MoveTo(Vec2::new(200.0, 200.0)))))
        .unwrap();
    world.set_updates_enabled(idle, false).unwrap();

    let outcomes = world.update_sprites().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].0, mover);
    assert!(outcomes[0].1.touched(wall));
    assert_relative_eq!(world.position(mover).unwrap().x, 20.0);
    assert_eq!(world.position(idle).unwrap(), Vec2::new(0.0, 50.0));
}

#[test]
fn test_moves_dirty_old_and_new_bounds() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(10.0, 10.0, 10.0, 10.0));
    let hidden = sprite_at(&mut world, Rect::new(100.0, 100.0, 10.0, 10.0));
    world.set_visible(hidden, false).unwrap();
    world.drain_dirty_rects();

    world.move_to(a, Vec2::new(50.0, 10.0)).unwrap();
    world.move_to(hidden, Vec2::new(150.0, 100.0)).unwrap();
    assert_eq!(
        world.drain_dirty_rects(),
        vec![Rect::new(10.0, 10.0, 10.0, 10.0), Rect::new(50.0, 10.0, 10.0, 10.0)]
    );

    world.set_visible(hidden, true).unwrap();
    assert_eq!(world.dirty_rects(), &[Rect::new(150.0, 100.0, 10.0, 10.0)]);
}

#[test]
fn test_draw_visits_dirty_regions_in_z_order() {
    let mut world = SpriteWorld::new();
    let back = sprite_at(&mut world, Rect::new(10.0, 10.0, 20.0, 20.0));
    let front = sprite_at(&mut world, Rect::new(15.0, 15.0, 20.0, 20.0));
    world.set_z_index(back, 3).unwrap();
    world.set_z_index(front, 4).unwrap();
    world.drain_dirty_rects();

    world.add_dirty_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
    let mut recorder = Recorder::default();
    assert_eq!(world.draw_sprites(&mut recorder), 2);
    assert_eq!(
        recorder.calls,
        vec![
            (back, Rect::new(10.0, 10.0, 20.0, 20.0), Rect::new(10.0, 10.0, 10.0, 10.0)),
            (front, Rect::new(15.0, 15.0, 20.0, 20.0), Rect::new(15.0, 15.0, 5.0, 5.0)),
        ]
    );

    // Nothing dirty, nothing drawn
    assert_eq!(world.draw_sprites(&mut recorder), 0);
}

#[test]
fn test_opaque_sprite_hides_what_it_covers() {
    let mut world = SpriteWorld::new();
    let below = sprite_at(&mut world, Rect::new(0.0, 0.0, 100.0, 100.0));
    let cover = sprite_at(&mut world, Rect::new(0.0, 0.0, 100.0, 100.0));
    world.set_opaque(cover, true).unwrap();
    world.drain_dirty_rects();

    world.add_dirty_rect(Rect::new(10.0, 10.0, 5.0, 5.0));
    let mut recorder = Recorder::default();
    world.draw_sprites(&mut recorder);
    let drawn: Vec<SpriteId> = recorder.calls.iter().map(|call| call.0).collect();
    assert_eq!(drawn, vec![cover]);
    assert!(!drawn.contains(&below));
}

#[test]
fn test_draw_offset_and_clip_rects() {
    let mut world = SpriteWorld::new();
    let moved = sprite_at(&mut world, Rect::new(10.0, 10.0, 20.0, 20.0));
    let fixed = sprite_at(&mut world, Rect::new(50.0, 50.0, 10.0, 10.0));
    world.set_ignores_draw_offset(fixed, true).unwrap();
    world.set_z_index(fixed, 1).unwrap();
    world.set_clip_rect(moved, Rect::new(0.0, 0.0, 20.0, 20.0)).unwrap();
    world.drain_dirty_rects();

    world.set_draw_offset(Vec2::new(5.0, 0.0));
    assert_eq!(world.dirty_rects(), &[Rect::new(0.0, 0.0, 400.0, 240.0)]);

    let mut recorder = Recorder::default();
    world.draw_sprites(&mut recorder);
    assert_eq!(
        recorder.calls,
        vec![
            (moved, Rect::new(15.0, 10.0, 20.0, 20.0), Rect::new(15.0, 10.0, 5.0, 10.0)),
            (fixed, Rect::new(50.0, 50.0, 10.0, 10.0), Rect::new(50.0, 50.0, 10.0, 10.0)),
        ]
    );
}

#[test]
fn test_clip_rects_in_z_range() {
    let mut world = SpriteWorld::new();
    let ids: Vec<SpriteId> = (0..3)
        .map(|z| {
            let id = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
            world.set_z_index(id, z).unwrap();
            id
        })
        .collect();
    let clip = Rect::new(0.0, 0.0, 5.0, 5.0);

    world.set_clip_rects_in_range(clip, 1, 2).unwrap();
    assert_eq!(world.clip_rect(ids[0]).unwrap(), None);
    assert_eq!(world.clip_rect(ids[1]).unwrap(), Some(clip));
    assert_eq!(world.clip_rect(ids[2]).unwrap(), Some(clip));

    world.clear_clip_rects_in_range(2, 2).unwrap();
    assert_eq!(world.clip_rect(ids[1]).unwrap(), Some(clip));
    assert_eq!(world.clip_rect(ids[2]).unwrap(), None);
}

#[test]
fn test_set_image_resizes_and_dirties() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    world.drain_dirty_rects();

    world
        .set_image(a, ImageHandle(3), Vec2::new(32.0, 16.0), ImageFlip::FlippedX)
        .unwrap();
    assert_eq!(world.bounds(a).unwrap(), Rect::new(0.0, 0.0, 32.0, 16.0));
    assert_eq!(world.image(a).unwrap(), Some(ImageHandle(3)));
    assert_eq!(world.image_flip(a).unwrap(), ImageFlip::FlippedX);
    assert!(!world.dirty_rects().is_empty());

    world.clear_image(a).unwrap();
    assert_eq!(world.image(a).unwrap(), None);
}

#[test]
fn test_always_redraw_repaints_display() {
    let mut world = SpriteWorld::with_config(WorldConfig::new().with_always_redraw(true)).unwrap();
    assert!(world.always_redraw());
    assert_eq!(world.drain_dirty_rects(), vec![Rect::new(0.0, 0.0, 400.0, 240.0)]);

    world.set_always_redraw(false);
    let id = world.create_sprite();
    world.mark_dirty(id).unwrap();
    assert!(world.drain_dirty_rects().is_empty());
}

#[test]
fn test_reset_collision_world_rebuilds_index() {
    let mut world = SpriteWorld::with_config(WorldConfig::new().with_cell_size(8.0)).unwrap();
    let a = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(5.0, 5.0, 10.0, 10.0));

    world.reset_collision_world();
    assert_eq!(world.sprites_at_point(Vec2::new(7.0, 7.0)), vec![a, b]);
    assert_eq!(world.overlapping_sprites(b).unwrap(), vec![a]);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = SpriteWorld::with_config(WorldConfig::new().with_cell_size(-1.0));
    assert!(matches!(result, Err(SpriteError::InvalidConfig(_))));

    let result = SpriteWorld::from_config_file("world.json");
    assert!(matches!(
        result,
        Err(SpriteError::Config(ConfigError::UnsupportedFormat(_)))
    ));
}

#[test]
fn test_reset_world_repaints_with_draw_offset() {
    let mut world = SpriteWorld::new();
    sprite_at(&mut world, Rect::new(10.0, 10.0, 10.0, 10.0));
    world.set_draw_offset(Vec2::new(5.0, 0.0));
    world.drain_dirty_rects();

    world.reset_world();
    assert_eq!(world.dirty_rects(), &[Rect::new(15.0, 10.0, 10.0, 10.0)]);

    let mut recorder = Recorder::default();
    assert_eq!(world.draw_sprites(&mut recorder), 0);
    assert!(world.dirty_rects().is_empty());
}

#[test]
fn test_draw_hook_replaces_renderer() {
    let mut world = SpriteWorld::new();
    let plain = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    let hooked = sprite_at(&mut world, Rect::new(20.0, 0.0, 10.0, 10.0));

    let seen: Rc<RefCell<Vec<(SpriteId, Rect, Rect)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    world
        .set_draw_fn(
            hooked,
            Some(draw_fn(move |sprite: &Sprite, bounds, draw_rect| {
                sink.borrow_mut().push((sprite.id(), bounds, draw_rect));
            })),
        )
        .unwrap();

    let mut recorder = Recorder::default();
    world.draw_sprites(&mut recorder);

    let drawn: Vec<SpriteId> = recorder.calls.iter().map(|call| call.0).collect();
    assert_eq!(drawn, vec![plain]);
    assert_eq!(
        seen.borrow().as_slice(),
        &[(hooked, Rect::new(20.0, 0.0, 10.0, 10.0), Rect::new(20.0, 0.0, 10.0, 10.0))]
    );

    // Copies keep the hook, clearing it hands the sprite back to the renderer
    let copy = world.copy_sprite(hooked).unwrap();
    world.set_draw_fn(hooked, None).unwrap();
    seen.borrow_mut().clear();
    let mut recorder = Recorder::default();
    world.draw_sprites(&mut recorder);

    assert!(recorder.calls.iter().any(|call| call.0 == hooked));
    assert!(recorder.calls.iter().all(|call| call.0 != copy));
    assert!(!seen.borrow().is_empty());
    assert!(seen.borrow().iter().all(|call| call.0 == copy));
}

#[test]
fn test_world_extent_rect_query() {
    let mut world = SpriteWorld::new();
    let a = sprite_at(&mut world, Rect::new(-4000.0, 10.0, 10.0, 10.0));
    let b = sprite_at(&mut world, Rect::new(9000.0, -70.0, 10.0, 10.0));

    let found = world.sprites_in_rect(Rect::new(-1.0e20, -1.0e20, 2.0e20, 2.0e20));
    assert_eq!(found, vec![a, b]);
}

#[test]
fn test_display_bounds_and_response_lookup() {
    let mut world = SpriteWorld::new();
    let id = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    world.drain_dirty_rects();

    let display = Rect::new(0.0, 0.0, 160.0, 144.0);
    world.set_display_bounds(display).unwrap();
    assert_eq!(world.display_bounds(), display);
    assert_eq!(world.config().display_bounds, display);
    assert_eq!(world.dirty_rects(), &[display]);
    assert!(matches!(
        world.set_display_bounds(Rect::zero()),
        Err(SpriteError::InvalidConfig(_))
    ));

    assert!(!world.has_collision_response_fn(id).unwrap());
    world
        .set_collision_response_fn(id, Some(constant_response(CollisionResponse::Slide)))
        .unwrap();
    assert!(world.has_collision_response_fn(id).unwrap());
    world.remove_sprite(id).unwrap();
    assert!(world.has_collision_response_fn(id).is_err());
}

#[test]
fn test_setters_reject_removed_handles() {
    let mut world = SpriteWorld::new();
    let id = sprite_at(&mut world, Rect::new(0.0, 0.0, 10.0, 10.0));
    world.set_tag(id, 3).unwrap();
    assert_eq!(world.tag(id).unwrap(), 3);
    world.remove_sprite(id).unwrap();

    assert!(matches!(world.set_tag(id, 4), Err(SpriteError::InvalidHandle(_))));
    assert!(matches!(world.set_userdata(id, None), Err(SpriteError::InvalidHandle(_))));
    assert!(matches!(
        world.set_image_flip(id, ImageFlip::default()),
        Err(SpriteError::InvalidHandle(_))
    ));
    assert!(matches!(world.set_z_index(id, 1), Err(SpriteError::InvalidHandle(_))));
    assert!(matches!(world.set_visible(id, false), Err(SpriteError::InvalidHandle(_))));
    assert!(matches!(world.remove_sprite(id), Err(SpriteError::InvalidHandle(_))));
}
