use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::ecs::message::{Message, MessageReader};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_tank_battle::prelude::*;

const STEP: Duration = Duration::from_millis(20);

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<ScoreSubmission>>>);

impl ScoreSink for RecordingSink {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SubmitError> {
        self.0.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

struct FailingSink;

impl ScoreSink for FailingSink {
    fn submit(&mut self, _: &ScoreSubmission) -> Result<(), SubmitError> {
        Err(SubmitError::Unavailable("offline".into()))
    }
}

/// Messages seen by the host since the app was built.
#[derive(Resource, Default)]
struct Received {
    spawned: usize,
    bursts: usize,
}

fn record_messages(
    mut spawned: MessageReader<ProjectileSpawned>,
    mut bursts: MessageReader<BalloonBurst>,
    mut received: ResMut<Received>,
) {
    received.spawned += spawned.read().count();
    received.bursts += bursts.read().count();
}

fn test_app(rules: GameRules) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(TankBattlePluginGroup)
        .insert_resource(rules)
        .insert_resource(Time::<Fixed>::from_duration(STEP))
        .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .init_resource::<Received>()
        .add_systems(Last, record_messages);
    app
}

fn received(app: &App) -> (usize, usize) {
    let received = app.world().resource::<Received>();
    (received.spawned, received.bursts)
}

fn write<M: Message>(app: &mut App, message: M) {
    app.world_mut().write_message(message);
}

fn start(app: &mut App, name: &str) {
    write(app, StartMatchRequest::new(name));
    app.update();
}

fn state(app: &App) -> &MatchState {
    app.world().resource::<MatchState>()
}

fn count<C: Component>(app: &mut App) -> usize {
    let mut query = app.world_mut().query::<&C>();
    query.iter(app.world()).count()
}

fn spawn_projectile(app: &mut App, kind: ProjectileKind, owner: PlayerId, position: Vec3, direction: Vec3) -> Entity {
    let epoch = state(app).epoch;
    let id = app.world_mut().resource_mut::<ProjectileIdAllocator>().allocate();
    app.world_mut()
        .spawn((
            Projectile::launch(id, kind, direction, owner).with_previous_position(position),
            Transform::from_translation(position),
            MatchScoped { epoch },
        ))
        .id()
}

fn hit(app: &mut App, owner: PlayerId, kind: ProjectileKind, tag: BodyTag) {
    let projectile = spawn_projectile(app, kind, owner, Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z);
    write(
        app,
        ProjectileContact {
            projectile,
            tag,
            point: Vec3::new(0.0, 1.0, 0.0),
        },
    );
    app.update();
}

fn pull_trigger(app: &mut App) {
    app.world_mut().resource_mut::<TankControls>().fire = true;
    app.update();
    app.world_mut().resource_mut::<TankControls>().fire = false;
    app.update();
}

#[test]
fn match_start_spawns_tanks_and_balloons() {
    let mut app = test_app(GameRules::score_attack());
    start(&mut app, "ada");

    assert_eq!(state(&app).phase, MatchPhase::Running);
    assert_eq!(count::<Tank>(&mut app), 1);
    assert_eq!(count::<Balloon>(&mut app), 20);
}

#[test]
fn second_start_while_running_is_ignored() {
    let mut app = test_app(GameRules::score_attack());
    start(&mut app, "ada");
    start(&mut app, "bob");

    assert_eq!(state(&app).epoch, 1);
    assert_eq!(state(&app).players[0].name, "ada");
    assert_eq!(count::<Tank>(&mut app), 1);
}

#[test]
fn standard_shell_follows_free_fall() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    let shell = spawn_projectile(
        &mut app,
        ProjectileKind::Standard,
        PlayerId(1),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::NEG_Z,
    );

    // 50 fixed steps of 20 ms
    for _ in 0..50 {
        app.update();
    }

    let transform = app.world().get::<Transform>(shell).unwrap();
    assert!((transform.translation.y - (-3.9)).abs() < 0.2);
    assert!(transform.translation.z < -25.0);
}

#[test]
fn missile_ammo_runs_out_after_five_shots() {
    let rules = GameRules::score_attack().with_fire_cooldown(0.0).with_balloons(0, 0);
    let mut app = test_app(rules);
    start(&mut app, "ada");
    app.world_mut().resource_mut::<TankControls>().select(BulletKind::Missile);

    for _ in 0..5 {
        pull_trigger(&mut app);
    }
    assert_eq!(count::<Projectile>(&mut app), 5);
    assert_eq!(state(&app).players[0].ammo.missiles, 0);

    pull_trigger(&mut app);
    assert_eq!(count::<Projectile>(&mut app), 5);
    assert_eq!(state(&app).players[0].ammo.missiles, 0);
}

#[test]
fn fire_request_with_non_finite_origin_spawns_nothing() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");

    let request = FireRequest::new(PlayerId(1), Vec3::splat(f32::NAN), Vec3::NEG_Z).with_kind(BulletKind::Missile);
    write(&mut app, request);
    app.update();

    assert_eq!(count::<Projectile>(&mut app), 0);
    assert_eq!(received(&app).0, 0);
    let player = &state(&app).players[0];
    assert_eq!(player.ammo.missiles, 5);
    assert_eq!(player.fire_cooldown, 0.0);
}

#[test]
fn holding_fire_shoots_once() {
    let rules = GameRules::score_attack().with_fire_cooldown(0.0).with_balloons(0, 0);
    let mut app = test_app(rules);
    start(&mut app, "ada");

    app.world_mut().resource_mut::<TankControls>().fire = true;
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(count::<Projectile>(&mut app), 1);
}

#[test]
fn cooldown_blocks_rapid_fire() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");

    pull_trigger(&mut app);
    pull_trigger(&mut app);
    assert_eq!(count::<Projectile>(&mut app), 1);

    // 2 s cooldown
    for _ in 0..100 {
        app.update();
    }
    // The first shell has fallen out of the battlefield by now
    pull_trigger(&mut app);
    assert_eq!(count::<Projectile>(&mut app), 1);
    assert!(state(&app).players[0].fire_cooldown > 0.0);
}

#[test]
fn enemy_hits_damage_and_own_hits_do_not() {
    let rules = GameRules::elimination().with_damage_per_hit(10).with_balloons(0, 0);
    let mut app = test_app(rules);
    start(&mut app, "ada");
    let (me, enemy) = (PlayerId(1), PlayerId(2));

    for _ in 0..3 {
        hit(&mut app, enemy, ProjectileKind::Standard, BodyTag::Tank { owner: me });
    }
    assert_eq!(state(&app).player(me).unwrap().health, 70);

    hit(&mut app, me, ProjectileKind::Standard, BodyTag::Tank { owner: me });
    assert_eq!(state(&app).player(me).unwrap().health, 70);
    assert_eq!(count::<Projectile>(&mut app), 0);
}

#[test]
fn scenery_hits_only_leave_fire() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");

    hit(&mut app, PlayerId(1), ProjectileKind::Standard, BodyTag::House);
    assert_eq!(state(&app).players[0].health, 100);
    assert_eq!(state(&app).players[0].score, 0);
    assert_eq!(count::<ImpactFire>(&mut app), 1);
}

#[test]
fn second_contact_of_same_projectile_is_ignored() {
    let rules = GameRules::elimination().with_balloons(0, 0);
    let mut app = test_app(rules);
    start(&mut app, "ada");

    let projectile = spawn_projectile(&mut app, ProjectileKind::Standard, PlayerId(2), Vec3::Y, Vec3::NEG_Z);
    for _ in 0..2 {
        write(
            &mut app,
            ProjectileContact {
                projectile,
                tag: BodyTag::Tank { owner: PlayerId(1) },
                point: Vec3::ZERO,
            },
        );
    }
    app.update();
    assert_eq!(state(&app).player(PlayerId(1)).unwrap().health, 80);
}

#[test]
fn balloon_bursts_once_and_scores() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    let epoch = state(&app).epoch;
    app.world_mut().spawn((
        Balloon::new(BalloonId(99), 20),
        BodyTag::Balloon { id: BalloonId(99) },
        Transform::from_xyz(0.0, 20.0, 0.0),
        MatchScoped { epoch },
    ));

    let tag = BodyTag::Balloon { id: BalloonId(99) };
    hit(&mut app, PlayerId(1), ProjectileKind::Standard, tag);
    assert_eq!(state(&app).players[0].score, 20);
    assert_eq!(count::<Balloon>(&mut app), 0);
    assert_eq!(count::<BurstLabel>(&mut app), 1);

    hit(&mut app, PlayerId(1), ProjectileKind::Standard, tag);
    assert_eq!(state(&app).players[0].score, 20);
}

#[test]
fn missile_impact_releases_five_submissiles() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");

    hit(&mut app, PlayerId(1), ProjectileKind::Missile, BodyTag::Terrain);

    let mut query = app.world_mut().query::<&Projectile>();
    let subs: Vec<Projectile> = query.iter(app.world()).cloned().collect();
    assert_eq!(subs.len(), 5);
    for sub in &subs {
        assert_eq!(sub.kind, ProjectileKind::Submissile);
        assert_eq!(sub.owner, PlayerId(1));
        assert!((sub.direction.length() - 1.0).abs() < 1e-5);
    }

    let first = {
        let mut query = app.world_mut().query::<(Entity, &Projectile)>();
        query.iter(app.world()).map(|(e, _)| e).next().unwrap()
    };
    write(
        &mut app,
        ProjectileContact {
            projectile: first,
            tag: BodyTag::Terrain,
            point: Vec3::ZERO,
        },
    );
    app.update();
    assert_eq!(count::<Projectile>(&mut app), 4);
}

#[test]
fn super_bomb_blasts_are_staggered_and_harmless() {
    let rules = GameRules::elimination().with_balloons(0, 0);
    let mut app = test_app(rules);
    start(&mut app, "ada");

    hit(&mut app, PlayerId(2), ProjectileKind::SuperBomb, BodyTag::Tank { owner: PlayerId(1) });
    assert_eq!(state(&app).player(PlayerId(1)).unwrap().health, 80);
    // The center blast goes off in the impact frame
    assert_eq!(count::<SecondaryBlast>(&mut app), 4);

    // Last blast fires 0.8 s after impact
    for _ in 0..10 {
        app.update();
    }
    let pending = count::<SecondaryBlast>(&mut app);
    assert!(pending > 0 && pending < 5);

    for _ in 0..40 {
        app.update();
    }
    assert_eq!(count::<SecondaryBlast>(&mut app), 0);
    assert_eq!(state(&app).player(PlayerId(1)).unwrap().health, 80);
}

#[test]
fn projectile_leaving_battlefield_is_removed() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    spawn_projectile(
        &mut app,
        ProjectileKind::Standard,
        PlayerId(1),
        Vec3::new(49.9, 10.0, 0.0),
        Vec3::X,
    );

    app.update();
    assert_eq!(count::<Projectile>(&mut app), 0);
}

#[test]
fn projectile_with_non_finite_velocity_is_removed() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    let shell = spawn_projectile(
        &mut app,
        ProjectileKind::Standard,
        PlayerId(1),
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::NEG_Z,
    );
    app.world_mut().get_mut::<Projectile>(shell).unwrap().velocity.x = f32::NAN;

    app.update();
    assert_eq!(count::<Projectile>(&mut app), 0);
}

#[test]
fn projectile_with_non_finite_position_is_removed() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    let shell = spawn_projectile(
        &mut app,
        ProjectileKind::Missile,
        PlayerId(1),
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::NEG_Z,
    );
    app.world_mut().get_mut::<Transform>(shell).unwrap().translation.y = f32::NAN;

    app.update();
    assert_eq!(count::<Projectile>(&mut app), 0);
}

#[test]
fn balloon_struck_after_match_over_stays_intact() {
    let rules = GameRules::score_attack().with_duration(Some(0.05)).with_balloons(0, 0);
    let mut app = test_app(rules);
    start(&mut app, "ada");
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(state(&app).phase, MatchPhase::Over);

    let epoch = state(&app).epoch;
    app.world_mut().spawn((
        Balloon::new(BalloonId(5), 50),
        BodyTag::Balloon { id: BalloonId(5) },
        Transform::from_xyz(0.0, 20.0, 0.0),
        MatchScoped { epoch },
    ));
    hit(&mut app, PlayerId(1), ProjectileKind::Standard, BodyTag::Balloon { id: BalloonId(5) });

    assert_eq!(count::<Balloon>(&mut app), 1);
    assert_eq!(count::<BurstLabel>(&mut app), 0);
    assert_eq!(received(&app).1, 0);
    assert_eq!(state(&app).players[0].score, 0);
}

#[test]
fn timed_match_submits_score_exactly_once() {
    let sink = RecordingSink::default();
    let rules = GameRules::score_attack().with_duration(Some(0.1)).with_balloons(0, 0);
    let mut app = test_app(rules);
    app.insert_resource(ScoreReporter::new(sink.clone()));
    start(&mut app, "ada");
    app.world_mut().resource_mut::<MatchState>().award_points(PlayerId(1), 45);

    for _ in 0..10 {
        app.update();
    }
    assert_eq!(state(&app).phase, MatchPhase::Over);

    // A second completion trigger for the same match
    let duplicate = MatchOver {
        epoch: state(&app).epoch,
        reason: MatchEndReason::TimeUp,
        winner: None,
        player_name: "ada".into(),
        final_score: 45,
    };
    write(&mut app, duplicate);
    app.update();

    let submitted = sink.0.lock().unwrap();
    assert_eq!(submitted.as_slice(), &[ScoreSubmission::new("ada", 45)]);
}

#[test]
fn failed_submission_does_not_block_match_over() {
    let rules = GameRules::score_attack().with_duration(Some(0.05)).with_balloons(0, 0);
    let mut app = test_app(rules);
    app.insert_resource(ScoreReporter::new(FailingSink));
    start(&mut app, "ada");

    for _ in 0..10 {
        app.update();
    }
    assert_eq!(state(&app).phase, MatchPhase::Over);
    assert!(state(&app).score_submitted);
    assert_eq!(app.world().resource::<ScoreReporter>().failures(), 1);
}

#[test]
fn elimination_ends_when_health_runs_out() {
    let sink = RecordingSink::default();
    let mut app = test_app(GameRules::elimination().with_balloons(0, 0));
    app.insert_resource(ScoreReporter::new(sink.clone()));
    start(&mut app, "ada");

    for _ in 0..5 {
        hit(&mut app, PlayerId(1), ProjectileKind::Standard, BodyTag::Tank { owner: PlayerId(2) });
    }
    app.update();

    assert_eq!(state(&app).phase, MatchPhase::Over);
    assert_eq!(state(&app).winner, Some(PlayerId(1)));
    assert_eq!(sink.0.lock().unwrap().len(), 1);
}

#[test]
fn restart_clears_previous_match() {
    let rules = GameRules::score_attack().with_duration(Some(0.05));
    let mut app = test_app(rules);
    start(&mut app, "ada");
    pull_trigger(&mut app);
    hit(&mut app, PlayerId(1), ProjectileKind::SuperBomb, BodyTag::Terrain);

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(state(&app).phase, MatchPhase::Over);

    start(&mut app, "ada");
    let epoch = state(&app).epoch;
    assert_eq!(epoch, 2);
    assert_eq!(state(&app).players[0].fire_cooldown, 0.0);
    assert_eq!(count::<Tank>(&mut app), 1);
    assert_eq!(count::<Balloon>(&mut app), 20);
    assert_eq!(count::<SecondaryBlast>(&mut app), 0);

    let mut query = app.world_mut().query::<&MatchScoped>();
    assert!(query.iter(app.world()).all(|scope| scope.epoch == epoch));
}

#[test]
fn driving_moves_tank_and_mirrors_pose() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    app.world_mut().resource_mut::<TankControls>().forward = true;

    // 20 units/s for 0.5 s
    for _ in 0..25 {
        app.update();
    }

    let player = &state(&app).players[0];
    assert!(player.position.z < -9.0);
    let mut query = app.world_mut().query::<(&Tank, &Transform)>();
    let (_, transform) = query.single(app.world()).unwrap();
    assert_eq!(transform.translation, state(&app).players[0].position);
}

#[test]
fn hud_reports_selected_ammo() {
    let mut app = test_app(GameRules::score_attack().with_balloons(0, 0));
    start(&mut app, "ada");
    app.world_mut().resource_mut::<TankControls>().select(BulletKind::SuperBomb);
    app.update();

    let hud = state(&app).hud(PlayerId(1)).unwrap();
    assert_eq!(hud.selected, BulletKind::SuperBomb);
    assert_eq!(hud.ammo.super_bombs, 3);
    assert_eq!(hud.time_remaining.map(|t| t < 120.0), Some(true));
}
