use std::f32::consts::FRAC_PI_4;

use corridor_caster::{
    Compositor, Config, Controller, InputState, Map, MapError, Player, cast, project,
};

const STEP: f32 = 0.1;

#[test]
fn centre_ray_of_enclosed_room_hits_far_wall() {
    let map = Map::enclosed(16, 16);
    let player = Player::new([8.0, 8.0], 0.0);

    let angle = player.ray_angle(4, 8, FRAC_PI_4);
    assert_eq!(angle, 0.0);

    // wall row 15 starts 7 cells ahead of y = 8
    let hit = cast(player.pos, angle, &map, 16.0, STEP);
    assert!(hit.hit);
    assert!((hit.distance - 7.0).abs() <= STEP + 1e-3, "{}", hit.distance);
}

#[test]
fn every_column_of_a_closed_room_hits_something() {
    let map = Map::enclosed(16, 16);
    let player = Player::new([8.0, 8.0], 1.0);
    let config = Config::default();

    for column in 0..64 {
        let angle = player.ray_angle(column, 64, config.fov);
        let hit = cast(player.pos, angle, &map, config.max_depth, config.step);
        assert!(hit.hit, "column {column}");
        assert!(hit.distance <= config.max_depth);
    }
}

#[test]
fn walking_into_a_wall_stops_at_the_wall() {
    let map = Map::enclosed(16, 16);
    let mut player = Player::spawn(&map);
    let controller = Controller::from_config(&Config::default());
    let mut input = InputState {
        forward: true,
        ..InputState::default()
    };

    for _ in 0..200 {
        controller.update(&mut input, &mut player, &map);
    }

    assert!(player.pos[1] < 15.0 && player.pos[1] > 14.8, "{:?}", player.pos);
    assert!((player.pos[0] - 8.0).abs() < 1e-4);

    // facing the wall, the centre strip fills most of the column
    let hit = cast(player.pos, player.heading, &map, 16.0, STEP);
    let strip = project(&hit, 768, &Config::default().shading());
    assert!(strip.ceiling < 0);
    assert!(strip.wall_shade >= 149);
}

#[test]
fn text_map_round_trips_dimensions() {
    let rows = ["######", "#    #", "# ## #", "######"];
    let map = Map::from_text(&rows.join("\n")).unwrap();
    assert_eq!(map.height(), rows.len());
    assert_eq!(map.width(), rows[0].len());
    assert_eq!(map.rows(), rows);

    let ragged = "######\n#   #\n######";
    assert!(matches!(
        Map::from_text(ragged),
        Err(MapError::Ragged { row: 1, .. })
    ));
}

#[test]
fn rendering_reuses_the_frame_across_moves() {
    let map = Map::builtin("maze").unwrap();
    let config = Config {
        viewport_width: 80,
        viewport_height: 60,
        ..Config::default()
    };
    let mut player = Player::spawn(&map);
    let mut compositor = Compositor::new(config.viewport_width, config.viewport_height);

    let first = compositor.render(&map, &player, &config).pixels().to_vec();
    player.turn(1.0);
    let second = compositor.render(&map, &player, &config).pixels().to_vec();

    assert_eq!(first.len(), 80 * 60 * 4);
    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
}
