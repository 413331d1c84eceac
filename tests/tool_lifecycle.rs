use egui::{Pos2, Vec2};
use paint_scripts::brush::{FixedScatter, RandomScatter, Stamp};
use paint_scripts::config::ScriptConfig;
use paint_scripts::event::{Arg, Dispatch, Event, EventKind};
use paint_scripts::host::{HostCommand, MemoryHost, NodeId, Recorded, SceneTree};
use paint_scripts::tools::{GestureState, SprayTool, Tool, ToolBox, ToolType};
use serde_json::Value;

// A host with a single canvas node to paint on
fn canvas_host() -> (MemoryHost, NodeId) {
    let mut host = MemoryHost::new();
    let root = host.root();
    let canvas = host.add_node(root, "canvas", "canvas");
    (host, canvas)
}

fn tool_event(kind: EventKind, canvas: NodeId, x: f32, y: f32, which: u32) -> Event {
    Event::new(kind)
        .on(canvas)
        .with_args([Arg::from(x), Arg::from(y), Arg::from(which), Arg::from(0u32)])
}

fn spray_box(scatter: Box<dyn paint_scripts::ScatterSource>) -> ToolBox<MemoryHost> {
    let config = ScriptConfig::default();
    let mut toolbox = ToolBox::new(config.clone());
    let ledger = toolbox.ledger().clone();
    toolbox.add_tool(ToolType::Spray(SprayTool::with_scatter(config.spray, ledger, scatter)));
    toolbox
}

// Integer points a stamp of this radius reaches, counted independently
fn brute_force_count(center: Pos2, radius: f32) -> usize {
    let stamp = Stamp::new(center, radius);
    let reach = radius.ceil() as i32 + 1;
    let (cx, cy) = (center.x as i32, center.y as i32);
    let mut count = 0;
    for y in cy - reach..=cy + reach {
        for x in cx - reach..=cx + reach {
            if stamp.weight_at(x, y).is_some() {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn test_square_gesture_end_to_end() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    assert!(toolbox.select(&mut host, "square"));

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 10.0, 10.0, 1));
    assert_eq!(toolbox.ledger().outstanding(), 1);
    assert_eq!(toolbox.active().map(|tool| tool.name()), Some("square"));

    toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, 10.0, 10.0, 1));
    toolbox.handle(&mut host, &tool_event(EventKind::ToolEnd, canvas, 10.0, 10.0, 1));

    let paints = host.paints();
    assert_eq!(paints.len(), 2);
    let (preview_id, preview_samples, preview_options) = paints[0];
    let (commit_id, commit_samples, commit_options) = paints[1];
    assert!(preview_options.preview);
    assert!(!commit_options.preview);
    assert_eq!(preview_id, commit_id);
    assert_eq!(preview_samples, &[(10, 10, 255)]);
    assert_eq!(commit_samples, &[(10, 10, 255)]);

    let counts = toolbox.ledger().counts();
    assert_eq!((counts.holds, counts.releases), (1, 1));
    assert_eq!(
        toolbox.tool("square").map(|tool| tool.gesture().state()),
        Some(GestureState::Armed)
    );
}

#[test]
fn test_square_accumulates_a_stroke() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "square");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 1.0, 1.0, 1));
    for x in 1..4 {
        toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, x as f32 + 0.5, 1.0, 1));
    }
    toolbox.handle(&mut host, &tool_event(EventKind::ToolEnd, canvas, 3.0, 1.0, 1));

    let paints = host.paints();
    let (_, samples, options) = paints.last().copied().unwrap();
    assert!(!options.preview);
    assert_eq!(samples, &[(1, 1, 255), (2, 1, 255), (3, 1, 255)]);
    assert_eq!(toolbox.ledger().outstanding(), 0);
}

#[test]
fn test_spray_stamp_matches_brute_force() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = spray_box(Box::new(FixedScatter(Vec2::ZERO)));
    toolbox.select(&mut host, "spray");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 100.0, 100.0, 1));

    let report = toolbox
        .tool("spray")
        .and_then(ToolType::as_spray)
        .and_then(SprayTool::last_stamp)
        .unwrap();
    assert_eq!(report.stamp.radius, 50.0);
    assert_eq!(report.samples, brute_force_count(Pos2::new(100.0, 100.0), 50.0));

    let paints = host.paints();
    let (_, samples, options) = paints[0];
    assert!(options.preview);
    assert_eq!(options.surface, Some(canvas));
    assert_eq!(samples.len(), report.samples);
    assert!(samples.iter().all(|&(_, _, w)| w >= 1));
    assert!(samples.contains(&(100, 100, 255)));
}

#[test]
fn test_spray_jitter_shrinks_the_stamp() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = spray_box(Box::new(FixedScatter(Vec2::new(30.0, 40.0))));
    toolbox.select(&mut host, "spray");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 0.0, 0.0, 1));

    let report = toolbox
        .tool("spray")
        .and_then(ToolType::as_spray)
        .and_then(SprayTool::last_stamp)
        .unwrap();
    // 50 - 2500 / 50
    assert_eq!(report.stamp.radius, 0.0);
    assert_eq!(report.samples, 0);
    assert_eq!(report.stamp.center, Pos2::new(30.0, 40.0));
}

#[test]
fn test_spray_accumulates_with_max_blend() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = spray_box(Box::new(RandomScatter::seeded(7)));
    toolbox.select(&mut host, "spray");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 50.0, 50.0, 1));
    for step in 0..5 {
        let x = 50.0 + step as f32 * 3.0;
        toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, x, 50.0, 1));
    }
    toolbox.handle(&mut host, &tool_event(EventKind::ToolEnd, canvas, 62.0, 50.0, 1));

    let paints = host.paints();
    let (_, committed, options) = paints.last().copied().unwrap();
    assert!(!options.preview);
    assert!(committed.iter().all(|&(_, _, w)| (1..=255).contains(&w)));

    // every preview is contained in the commit at no more than its weight
    for (_, preview, _) in &paints[..paints.len() - 1] {
        for &(x, y, w) in preview.iter() {
            let final_weight = committed
                .iter()
                .find(|&&(cx, cy, _)| (cx, cy) == (x, y))
                .map(|&(_, _, cw)| cw)
                .unwrap();
            assert!(final_weight >= w);
        }
    }
    assert_eq!(toolbox.ledger().outstanding(), 0);
    assert!(!host.cursor_hidden());
}

#[test]
fn test_hover_spray_previews_a_fresh_cursor() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = spray_box(Box::new(FixedScatter(Vec2::ZERO)));
    toolbox.select(&mut host, "spray");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 10.0, 10.0, 0));
    toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, 200.0, 10.0, 0));
    toolbox.handle(&mut host, &tool_event(EventKind::ToolEnd, canvas, 200.0, 10.0, 0));

    let paints = host.paints();
    assert_eq!(paints.len(), 2);
    assert!(paints.iter().all(|(_, _, options)| options.preview && options.cursor));
    // the second cursor does not keep the first stamp
    assert!(!paints[1].1.iter().any(|&(x, y, _)| (x, y) == (10, 10)));
    assert_eq!(toolbox.ledger().outstanding(), 0);
}

#[test]
fn test_switching_tools_aborts_the_outgoing_gesture() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "square");
    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 4.0, 4.0, 1));
    toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, 4.0, 4.0, 1));
    assert_eq!(toolbox.ledger().outstanding(), 1);

    assert!(toolbox.select(&mut host, "hand"));

    assert_eq!(toolbox.ledger().outstanding(), 0);
    assert!(host.paints().iter().all(|(_, _, options)| options.preview));
    assert_eq!(
        toolbox.tool("square").map(|tool| tool.gesture().state()),
        Some(GestureState::Inactive)
    );
    assert_eq!(toolbox.selected().map(|tool| tool.name()), Some("hand"));
}

#[test]
fn test_deactivate_mid_gesture_releases_once() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "square");
    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 4.0, 4.0, 1));
    toolbox.handle(&mut host, &Event::new(EventKind::ToolDeactivate));
    toolbox.handle(&mut host, &Event::new(EventKind::ToolDeactivate));

    let counts = toolbox.ledger().counts();
    assert_eq!((counts.holds, counts.releases), (1, 1));
    assert!(toolbox.active().is_none());
}

#[test]
fn test_update_without_start_is_dropped_quietly() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "square");

    let outcome = toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, 1.0, 1.0, 1));

    assert!(outcome.was_handled());
    assert!(host.paints().is_empty());
    assert_eq!(toolbox.ledger().counts().holds, 0);
}

#[test]
fn test_events_without_a_selected_tool_are_dropped() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::<MemoryHost>::with_default_tools(ScriptConfig::default());
    let outcome = toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 1.0, 1.0, 1));
    assert!(!outcome.was_handled());
    assert!(!toolbox.select(&mut host, "lasso"));
}

#[test]
fn test_hand_toggles_editor_dragging() {
    let (mut host, canvas) = canvas_host();
    let root = host.root();
    let editor = host.add_node(root, "editor", "editor");
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "hand");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 0.0, 0.0, 1));
    assert_eq!(host.get(editor, "draggable"), Some(Value::Bool(true)));
    toolbox.handle(&mut host, &tool_event(EventKind::ToolEnd, canvas, 0.0, 0.0, 1));
    assert_eq!(host.get(editor, "draggable"), Some(Value::Bool(false)));
    assert_eq!(toolbox.ledger().counts().holds, 0);
}

#[test]
fn test_wheel_popup_lifecycle() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "wheel");

    let window = toolbox
        .tool("wheel")
        .and_then(ToolType::as_color_wheel)
        .and_then(|wheel| wheel.window())
        .unwrap();
    assert!(host.node(window).is_some());

    // pressing on the canvas closes the popup and goes back to the last tool
    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 0.0, 0.0, 1));
    assert!(host.node(window).is_none());
    assert_eq!(host.commands(), vec![&HostCommand::ToggleTool]);
}

#[test]
fn test_wheel_closed_by_switching_does_not_toggle_back() {
    let (mut host, _canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "wheel");
    toolbox.select(&mut host, "square");

    assert!(host.commands().is_empty());
    assert!(host.log().iter().any(|entry| matches!(entry, Recorded::Removed { .. })));
    assert!(
        toolbox
            .tool("wheel")
            .and_then(ToolType::as_color_wheel)
            .and_then(|wheel| wheel.window())
            .is_none()
    );
}

#[test]
fn test_wheel_popup_removed_by_host() {
    let (mut host, _canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "wheel");
    let window = toolbox
        .tool("wheel")
        .and_then(ToolType::as_color_wheel)
        .and_then(|wheel| wheel.window())
        .unwrap();

    host.remove(window);
    toolbox.handle(&mut host, &Event::new(EventKind::Remove).on(window));

    assert_eq!(host.commands(), vec![&HostCommand::ToggleTool]);
}

#[test]
fn test_unused_gesture_events_are_accepted() {
    let (mut host, canvas) = canvas_host();
    let mut toolbox = ToolBox::with_default_tools(ScriptConfig::default());
    toolbox.select(&mut host, "hand");

    toolbox.handle(&mut host, &tool_event(EventKind::ToolStart, canvas, 0.0, 0.0, 1));
    let outcome = toolbox.handle(&mut host, &tool_event(EventKind::ToolUpdate, canvas, 5.0, 5.0, 1));
    assert_eq!(outcome, Dispatch::FellBack);
    assert!(host.paints().is_empty());

    let outcome = toolbox.handle(&mut host, &Event::new(EventKind::ToolActivate));
    assert!(outcome.was_handled());
}
