//! Application reactor tests: command handling and frame production

mod common;

use common::builders::ConfigBuilder;
use common::mock_helpers::{ScriptHandle, ScriptedTransport};
use crossbeam_channel::{unbounded, Sender};
use serial_plotter::{AppConfig, Application, UiCommand, XWindow};

fn app_with(config: AppConfig) -> (Application, Sender<UiCommand>, ScriptHandle) {
    let (transport, handle) = ScriptedTransport::new();
    let (tx, rx) = unbounded();
    let app = Application::new(&config, Box::new(transport), rx).unwrap();
    (app, tx, handle)
}

fn frame_names(app: &mut Application) -> Vec<String> {
    app.run_frame()
        .series
        .iter()
        .map(|s| s.name.to_string())
        .collect()
}

#[test]
fn test_no_auto_start_without_port() {
    let (app, _tx, handle) = app_with(ConfigBuilder::new().build());
    assert!(handle.opened_ports().is_empty());
    assert!(!app.session().is_connected());
    assert!(app.is_running());
}

#[test]
fn test_auto_start_with_port() {
    let (app, _tx, handle) = app_with(ConfigBuilder::new().port("COM4").baud_rate(57600).build());
    assert_eq!(handle.opened_ports(), vec!["COM4".to_string()]);
    assert_eq!(handle.baud_rates(), vec![57600]);
    assert!(app.session().is_connected());
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let (transport, _handle) = ScriptedTransport::new();
    let (_tx, rx) = unbounded();
    let config = ConfigBuilder::new().follow_window(0).build();
    match Application::new(&config, Box::new(transport), rx) {
        Err(e) => {
            assert!(e.is_configuration());
            assert!(e.to_string().ends_with("follow window must be positive"));
        }
        Ok(_) => panic!("zero follow window accepted"),
    }

    let (transport, _handle) = ScriptedTransport::new();
    let (_tx, rx) = unbounded();
    let config = ConfigBuilder::new().graph_filter("[").build();
    match Application::new(&config, Box::new(transport), rx) {
        Err(e) => assert!(e.is_configuration()),
        Ok(_) => panic!("invalid graph filter accepted"),
    }
}

#[test]
fn test_commands_open_and_plot() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().build());

    tx.send(UiCommand::SetPort("/dev/ttyACM0".to_string())).unwrap();
    tx.send(UiCommand::SetBaudRate(115200)).unwrap();
    tx.send(UiCommand::Open).unwrap();
    handle.push(b"a:1,b:2\n");

    assert_eq!(frame_names(&mut app), vec!["a", "b"]);
    assert_eq!(handle.opened_ports(), vec!["/dev/ttyACM0".to_string()]);
    assert_eq!(handle.baud_rates(), vec![115200]);
}

#[test]
fn test_graph_filter_selects_series() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().port("COM3").build());
    handle.push(b"a:1,b:2,ab:3\n");
    assert_eq!(frame_names(&mut app).len(), 3);

    tx.send(UiCommand::SetGraphFilter("^a".to_string())).unwrap();
    assert_eq!(frame_names(&mut app), vec!["a", "ab"]);

    // Invalid pattern keeps the previous one and is reported
    tx.send(UiCommand::SetGraphFilter("(".to_string())).unwrap();
    assert_eq!(frame_names(&mut app), vec!["a", "ab"]);
    assert!(app.pending_error().is_some());

    // Data is still stored for hidden series
    assert!(app.session().store().series("b").is_some());
}

#[test]
fn test_name_filter_command() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().port("COM3").build());
    tx.send(UiCommand::SetNameFilter("^temp$".to_string())).unwrap();
    handle.push(b"temp:20,hum:50\n");
    app.run_frame();

    assert!(app.session().store().series("temp").is_some());
    assert!(app.session().store().series("hum").is_none());
}

#[test]
fn test_follow_window() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().port("COM3").build());
    for i in 0..10 {
        handle.push(format!("a:{}\n", i).as_bytes());
    }
    tx.send(UiCommand::SetFollowWindow(4)).unwrap();

    {
        let frame = app.run_frame();
        assert_eq!(frame.window, XWindow::Range { min_x: 6, max_x: 10 });
        assert_eq!(frame.series[0].visible, &[6.0, 7.0, 8.0, 9.0]);
    }

    tx.send(UiCommand::SetFollow(false)).unwrap();
    let frame = app.run_frame();
    assert_eq!(frame.window, XWindow::Unbounded);
    assert_eq!(frame.series[0].visible.len(), 10);
}

#[test]
fn test_rejected_command_is_logged() {
    let (mut app, tx, _handle) = app_with(ConfigBuilder::new().build());
    tx.send(UiCommand::SetFollowWindow(0)).unwrap();
    tx.send(UiCommand::SetBaudRate(1234)).unwrap();
    app.run_frame();

    assert_eq!(app.view().follow_window(), 300);
    assert_eq!(app.session().config().baud_rate, 9600);
    assert_eq!(
        app.session().messages().last(),
        Some("Baud Rate out of range: 1234")
    );
}

#[test]
fn test_separator_command() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().port("COM3").build());
    handle.push(b"a:1\r");
    app.run_frame();
    assert!(app.session().store().is_empty());

    tx.send("sep cr".parse().unwrap()).unwrap();
    app.run_frame();
    assert_eq!(
        app.session().store().series("a").unwrap().values(),
        &[1.0]
    );
}

#[test]
fn test_clear_data_and_summary() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().port("COM3").build());
    handle.push(b"a:1\na:3\n");
    app.run_frame();

    let summary = app.summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0], "a: last=3 min=1 max=3 avg=2.000 n=2");

    tx.send(UiCommand::ClearData).unwrap();
    app.run_frame();
    assert!(app.session().store().is_empty());
    assert!(app.summary().is_empty());
}

#[test]
fn test_quit_closes_and_stops() {
    let (mut app, tx, handle) = app_with(ConfigBuilder::new().port("COM3").build());
    tx.send(UiCommand::Quit).unwrap();
    // Commands after Quit are not applied
    tx.send(UiCommand::Open).unwrap();

    app.run_frame();
    assert!(!app.is_running());
    assert!(!handle.is_open());
    assert_eq!(handle.closes(), 1);
    assert_eq!(handle.opened_ports().len(), 1);

    let calls = handle.read_calls();
    handle.push(b"a:1\n");
    app.run_frame();
    assert_eq!(handle.read_calls(), calls);
}
