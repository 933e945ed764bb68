use uuid::Uuid;

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn orbit_class_tools() {
    assert!(Tool::Select.orbits_camera());
    assert!(Tool::Orbit.orbits_camera());
    assert!(!Tool::Measure.orbits_camera());
    assert!(!Tool::Create(Shape::Cube).orbits_camera());
}

#[test]
fn only_select_manipulates_objects() {
    assert!(Tool::Select.manipulates_objects());
    assert!(!Tool::Orbit.manipulates_objects());
    assert!(!Tool::Measure.manipulates_objects());
    assert!(!Tool::Create(Shape::Wall).manipulates_objects());
}

#[test]
fn create_tools_compare_by_shape() {
    assert_eq!(Tool::Create(Shape::Door), Tool::Create(Shape::Door));
    assert_ne!(Tool::Create(Shape::Door), Tool::Create(Shape::Window));
}

// =============================================================
// Shape
// =============================================================

#[test]
fn shape_categories() {
    let cases = [
        (Shape::Cube, Category::Basic),
        (Shape::Cone, Category::Basic),
        (Shape::Wall, Category::Architecture),
        (Shape::Window, Category::Architecture),
        (Shape::Chair, Category::Furniture),
        (Shape::Sofa, Category::Furniture),
        (Shape::Tree, Category::Landscape),
        (Shape::Rock, Category::Landscape),
    ];
    for (shape, category) in cases {
        assert_eq!(shape.category(), category, "{shape:?}");
    }
}

#[test]
fn shape_kind_tags() {
    assert_eq!(Shape::Cube.kind(), "cube");
    assert_eq!(Shape::Door.kind(), "door");
    assert_eq!(Shape::Table.kind(), "table");
}

// =============================================================
// InputState / UiState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(!state.is_dragging());
    assert_eq!(state.last_pointer(), None);
}

#[test]
fn dragging_exposes_last_pointer() {
    let state = InputState::Dragging {
        tool: Tool::Orbit,
        target: DragTarget::Camera,
        last_screen: Point::new(4.0, 9.0),
    };
    assert!(state.is_dragging());
    assert_eq!(state.last_pointer(), Some(Point::new(4.0, 9.0)));
}

#[test]
fn drag_targets_compare_by_id() {
    let id = Uuid::new_v4();
    assert_eq!(DragTarget::Object(id), DragTarget::Object(id));
    assert_ne!(DragTarget::Object(id), DragTarget::Camera);
}

#[test]
fn ui_state_default_has_no_selection() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(ui.selected_id.is_none());
    assert!(ui.measure_from.is_none());
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn shape_parses_from_its_kind() {
    for shape in Shape::ALL {
        assert_eq!(shape.kind().parse::<Shape>(), Ok(shape));
    }
    assert_eq!("pyramid".parse::<Shape>(), Err(UnknownTool("pyramid".into())));
}

#[test]
fn tool_display_round_trips() {
    for tool in [Tool::Select, Tool::Orbit, Tool::Measure, Tool::Create(Shape::Door)] {
        assert_eq!(tool.to_string().parse::<Tool>(), Ok(tool));
    }
}

#[test]
fn create_tool_keeps_whole_input_in_error() {
    assert_eq!("create:pyramid".parse::<Tool>(), Err(UnknownTool("create:pyramid".into())));
    assert_eq!("lasso".parse::<Tool>(), Err(UnknownTool("lasso".into())));
}
