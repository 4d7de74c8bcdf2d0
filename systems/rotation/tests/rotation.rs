use std::time::Duration;

use art_critic_core::{Attribute, Command, Event, RoundPhase};
use art_critic_system_rotation::{Config, Rotation, RotationInterval};
use art_critic_world::{self as world, query, Config as WorldConfig, World};

fn world_with_unlocked(initially_unlocked: usize) -> World {
    World::new(WorldConfig {
        initially_unlocked,
        ..WorldConfig::default()
    })
    .expect("valid world config")
}

fn tick(dt: Duration) -> Vec<Event> {
    vec![Event::TimeAdvanced { dt }]
}

#[test]
fn emits_set_target_once_per_period() {
    let world = world_with_unlocked(4);
    let config = Config::new(RotationInterval::Fixed(Duration::from_secs(30)), 7);
    let mut rotation = Rotation::new(config).expect("valid rotation config");
    let oracle = query::oracle_view(&world);
    let mut commands = Vec::new();

    rotation.handle(&tick(Duration::from_secs(29)), RoundPhase::Running, &oracle, &mut commands);
    assert!(commands.is_empty(), "no rotation before the period elapses");

    rotation.handle(&tick(Duration::from_secs(1)), RoundPhase::Running, &oracle, &mut commands);
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        Command::SetTarget { value } => {
            assert!(oracle.unlocked().contains(value));
            assert_ne!(Some(value), oracle.current());
        }
        other => panic!("unexpected command emitted: {other:?}"),
    }
}

#[test]
fn rotation_always_changes_to_an_unlocked_value() {
    let mut world = world_with_unlocked(3);
    let mut rotation =
        Rotation::new(Config::new(RotationInterval::default(), 0xdead_beef)).expect("valid");

    for _ in 0..50 {
        let oracle = query::oracle_view(&world);
        let previous = oracle.current().cloned();
        let value = rotation.rotate(&oracle).expect("values are unlocked");

        assert!(oracle.unlocked().contains(&value));
        assert_ne!(Some(&value), previous.as_ref());

        let mut events = Vec::new();
        world::apply(&mut world, Command::SetTarget { value: value.clone() }, &mut events);
        assert_eq!(events, vec![Event::TargetChanged { value }]);
    }
}

#[test]
fn single_unlocked_value_is_kept() {
    let world = world_with_unlocked(1);
    let mut rotation = Rotation::new(Config::new(RotationInterval::default(), 1)).expect("valid");
    let oracle = query::oracle_view(&world);
    assert_eq!(rotation.rotate(&oracle), Some(Attribute::new("StillLife")));
}

#[test]
fn nothing_unlocked_yields_no_rotation() {
    let world = world_with_unlocked(0);
    let config = Config::new(RotationInterval::Fixed(Duration::from_secs(1)), 1);
    let mut rotation = Rotation::new(config).expect("valid");
    let oracle = query::oracle_view(&world);
    let mut commands = Vec::new();

    rotation.handle(&tick(Duration::from_secs(5)), RoundPhase::Running, &oracle, &mut commands);

    assert!(commands.is_empty());
    assert_eq!(rotation.rotate(&oracle), None);
}

#[test]
fn finished_round_stops_rotation() {
    let world = world_with_unlocked(4);
    let config = Config::new(RotationInterval::Fixed(Duration::from_secs(2)), 3);
    let mut rotation = Rotation::new(config).expect("valid");
    let oracle = query::oracle_view(&world);
    let mut commands = Vec::new();

    rotation.handle(&tick(Duration::from_secs(1)), RoundPhase::Running, &oracle, &mut commands);
    rotation.handle(&tick(Duration::from_secs(5)), RoundPhase::Over, &oracle, &mut commands);
    rotation.handle(&tick(Duration::from_secs(1)), RoundPhase::Running, &oracle, &mut commands);

    assert!(commands.is_empty(), "accumulated time is discarded once the round ends");
}

#[test]
fn random_cadence_is_reproducible_for_a_seed() {
    let interval = RotationInterval::Random {
        min: Duration::from_secs(5),
        max: Duration::from_secs(15),
    };
    let first = Rotation::new(Config::new(interval, 77)).expect("valid");
    let second = Rotation::new(Config::new(interval, 77)).expect("valid");
    assert_eq!(first.period(), second.period());
    assert!(first.period() >= Duration::from_secs(5));
    assert!(first.period() <= Duration::from_secs(15));
}

#[test]
fn rotating_a_lone_value_announces_nothing() {
    let mut world = world_with_unlocked(1);
    let config = Config::new(RotationInterval::Fixed(Duration::from_secs(1)), 4);
    let mut rotation = Rotation::new(config).expect("valid");
    let mut commands = Vec::new();

    rotation.handle(
        &tick(Duration::from_secs(1)),
        RoundPhase::Running,
        &query::oracle_view(&world),
        &mut commands,
    );
    assert_eq!(commands.len(), 1);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert!(events.is_empty(), "an unchanged target is not announced again");
}
