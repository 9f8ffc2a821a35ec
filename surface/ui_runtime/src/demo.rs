//! Built-in mission-control dashboard stream used when no external producer
//! is attached.

use serde_json::{Value, json};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::protocol::{Envelope, MessageKind};
use crate::source::ScriptedEnvelope;

pub const SURFACE_ID: &str = "main";

const SKELETON_DELAY: Duration = Duration::from_millis(800);
const DASHBOARD_DELAY: Duration = Duration::from_millis(1200);

const PANEL: &str = "#181b21";
const TRACK: &str = "#333";

/// Heartbeat, skeleton, full dashboard, then `ticks` rounds of live values
/// spaced by `interval`. Zero ticks repeats forever.
pub fn script(ticks: u64, interval: Duration) -> impl Iterator<Item = ScriptedEnvelope> + Send + 'static {
    let opening = [
        ScriptedEnvelope::new(
            Duration::ZERO,
            envelope(
                MessageKind::Heartbeat,
                json!({ "status": "connected", "latency": "12ms" }),
            ),
        ),
        ScriptedEnvelope::new(SKELETON_DELAY, surface_envelope(skeleton())),
        ScriptedEnvelope::new(DASHBOARD_DELAY, surface_envelope(dashboard())),
    ];

    let rounds = (1_u64..)
        .take_while(move |tick| ticks == 0 || *tick <= ticks)
        .flat_map(move |tick| {
            tick_updates(tick)
                .into_iter()
                .enumerate()
                .map(move |(index, (path, value))| {
                    let delay = if index == 0 { interval } else { Duration::ZERO };
                    ScriptedEnvelope::new(
                        delay,
                        envelope(
                            MessageKind::DataModelUpdate,
                            json!({ "path": path, "value": value }),
                        ),
                    )
                })
        });

    opening.into_iter().chain(rounds)
}

/// Patch paths and values for one update round.
pub fn tick_updates(tick: u64) -> Vec<(&'static str, Value)> {
    let cpu = 20 + (tick * 37) % 60;
    let mem = 30 + (tick * 53) % 60;
    let therm = 5 + (tick * 17) % 40;
    let latency_min = 8 + (tick * 7) % 20;
    let latency_max = latency_min + 40 + (tick * 29) % 60;

    vec![
        ("cpu-value.props.text", json!(format!("{cpu}%"))),
        ("cpu-bar.props.style.width", json!(bar_width(cpu))),
        ("mem-value.props.text", json!(format!("{mem}%"))),
        ("mem-bar.props.style.width", json!(bar_width(mem))),
        ("therm-value.props.text", json!(format!("{therm}%"))),
        ("therm-bar.props.style.width", json!(bar_width(therm))),
        ("latency-min.props.text", json!(format!("Min: {latency_min}ms"))),
        ("latency-max.props.text", json!(format!("Max: {latency_max}ms"))),
    ]
}

pub fn skeleton() -> Value {
    json!({
        "id": "root",
        "type": "Surface",
        "props": { "style": {
            "flexDirection": "column", "padding": 40, "gap": 20, "alignItems": "center",
            "backgroundColor": "#0f1115", "width": 1000, "height": 800
        } },
        "children": [
            {
                "id": "header",
                "type": "Card",
                "props": {
                    "style": {
                        "width": 900, "height": 80, "borderRadius": 20, "backgroundColor": "#1c1f24",
                        "flexDirection": "row", "alignItems": "center", "padding": 20, "gap": 20
                    },
                    "elevation": 5
                },
                "children": [
                    { "id": "logo", "type": "Card", "props": { "style": {
                        "width": 40, "height": 40, "borderRadius": 20, "backgroundColor": "#3b82f6"
                    } } },
                    { "id": "title", "type": "Text", "props": { "text": "Loading...", "style": { "width": 400 } } }
                ]
            },
            {
                "id": "grid",
                "type": "Row",
                "props": { "style": {
                    "gap": 20, "width": 900, "height": 500, "flexDirection": "row", "justifyContent": "center"
                } },
                "children": []
            }
        ]
    })
}

pub fn dashboard() -> Value {
    let mut root = skeleton();
    root["children"][0]["children"][1]["props"]["text"] = json!("MISSION CONTROL");
    root["children"][1]["children"] = json!([system_widget(), network_widget(), cluster_widget()]);
    root
}

fn widget(id: &str, children: Vec<Value>) -> Value {
    json!({
        "id": id,
        "type": "Card",
        "props": {
            "style": {
                "width": 280, "height": 420, "borderRadius": 24, "padding": 24,
                "backgroundColor": PANEL, "flexDirection": "column", "gap": 20
            },
            "elevation": 10
        },
        "children": children
    })
}

fn text(id: String, text: &str, width: u64) -> Value {
    json!({ "id": id, "type": "Text", "props": { "text": text, "style": { "width": width } } })
}

fn heading(id: &str, label: &str) -> Value {
    json!({ "id": id, "type": "Text", "props": { "text": label, "style": { "height": 20, "width": 232 } } })
}

fn action(id: &str, label: &str, on_click: &str, color: &str) -> Value {
    json!({
        "id": id,
        "type": "Button",
        "props": {
            "text": label,
            "onClick": on_click,
            "style": { "width": 232, "height": 44, "borderRadius": 12, "backgroundColor": color }
        }
    })
}

fn dot(id: String, color: &str) -> Value {
    json!({ "id": id, "type": "Card", "props": { "style": {
        "width": 10, "height": 10, "borderRadius": 5, "backgroundColor": color
    } } })
}

fn progress_bar(label: &str, percent: u64, color: &str, prefix: &str) -> Value {
    json!({
        "id": format!("{prefix}-gauge"),
        "type": "Column",
        "props": { "style": { "gap": 5, "width": 220, "height": 40 } },
        "children": [
            {
                "id": format!("{prefix}-legend"),
                "type": "Row",
                "props": { "style": {
                    "width": 220, "height": 20, "justifyContent": "space-between", "alignItems": "center"
                } },
                "children": [
                    text(format!("{prefix}-label"), label, 100),
                    text(format!("{prefix}-value"), &format!("{percent}%"), 50)
                ]
            },
            {
                "id": format!("{prefix}-track"),
                "type": "Card",
                "props": { "style": { "width": 220, "height": 6, "borderRadius": 3, "backgroundColor": TRACK } },
                "children": [
                    {
                        "id": format!("{prefix}-bar"),
                        "type": "Card",
                        "props": {
                            "style": {
                                "width": bar_width(percent), "height": 6, "borderRadius": 3, "backgroundColor": color
                            },
                            "elevation": 2
                        }
                    }
                ]
            }
        ]
    })
}

fn system_widget() -> Value {
    widget(
        "w1",
        vec![
            heading("w1-heading", "SYSTEM INTEGRITY"),
            progress_bar("CPU Load", 34, "#3b82f6", "cpu"),
            progress_bar("Memory", 62, "#8b5cf6", "mem"),
            progress_bar("Thermal", 12, "#10b981", "therm"),
            json!({ "id": "w1-divider", "type": "Card", "props": { "style": {
                "width": 232, "height": 2, "backgroundColor": TRACK
            } } }),
            json!({
                "id": "w1-status",
                "type": "Row",
                "props": { "style": {
                    "width": 232, "height": 40, "justifyContent": "space-between", "alignItems": "center"
                } },
                "children": [
                    text("w1-status-label".to_string(), "STATUS", 80),
                    {
                        "id": "w1-status-badge",
                        "type": "Card",
                        "props": {
                            "style": { "width": 80, "height": 24, "borderRadius": 12, "backgroundColor": "#064e3b" },
                            "elevation": 5
                        },
                        "children": [ text("w1-status-value".to_string(), "OPTIMAL", 80) ]
                    }
                ]
            }),
            action("w1-action", "DIAGNOSTICS", "run_diag", "#3b82f6"),
        ],
    )
}

fn network_widget() -> Value {
    let bars: Vec<Value> = (0..12_u64)
        .map(|index| {
            json!({
                "id": format!("latency-bar-{index}"),
                "type": "Card",
                "props": {
                    "style": {
                        "width": 10, "height": 20 + (index * 23) % 80, "borderRadius": 4,
                        "backgroundColor": "#f59e0b"
                    },
                    "elevation": 5
                }
            })
        })
        .collect();

    widget(
        "w2",
        vec![
            heading("w2-heading", "NETWORK LATENCY"),
            json!({
                "id": "latency-histogram",
                "type": "Row",
                "props": { "style": {
                    "width": 232, "height": 120, "gap": 8, "alignItems": "flex-end", "justifyContent": "center",
                    "backgroundColor": "#111", "borderRadius": 12, "padding": 10
                } },
                "children": bars
            }),
            json!({
                "id": "latency-range",
                "type": "Row",
                "props": { "style": { "width": 232, "height": 30, "justifyContent": "space-between" } },
                "children": [
                    text("latency-min".to_string(), "Min: 12ms", 100),
                    text("latency-max".to_string(), "Max: 84ms", 100)
                ]
            }),
            json!({
                "id": "region",
                "type": "Card",
                "props": { "style": {
                    "width": 232, "height": 60, "borderRadius": 12, "backgroundColor": "#202020",
                    "flexDirection": "row", "alignItems": "center", "padding": 10, "gap": 10
                } },
                "children": [
                    { "id": "region-icon", "type": "Card", "props": { "style": {
                        "width": 40, "height": 40, "borderRadius": 20, "backgroundColor": "#f59e0b"
                    } } },
                    {
                        "id": "region-info",
                        "type": "Column",
                        "props": { "style": { "width": 150, "height": 40, "justifyContent": "center", "gap": 5 } },
                        "children": [
                            text("region-name".to_string(), "US-EAST-1", 150),
                            text("region-state".to_string(), "Connected", 150)
                        ]
                    }
                ]
            }),
            action("w2-action", "PING TEST", "ping", "#f59e0b"),
        ],
    )
}

fn cluster_widget() -> Value {
    let rows: Vec<Value> = (0..4_u64)
        .map(|row| {
            let cells: Vec<Value> = (0..6_u64)
                .map(|col| {
                    let active = (row * 6 + col) % 4 != 3;
                    let color = if active { "#10b981" } else { TRACK };
                    let elevation = if active { 5 } else { 0 };
                    json!({
                        "id": format!("cluster-{row}-{col}"),
                        "type": "Card",
                        "props": {
                            "style": {
                                "width": 25, "height": 25, "borderRadius": 4,
                                "backgroundColor": color
                            },
                            "elevation": elevation
                        }
                    })
                })
                .collect();

            json!({
                "id": format!("cluster-row-{row}"),
                "type": "Row",
                "props": { "style": { "gap": 5, "width": 232, "height": 25 } },
                "children": cells
            })
        })
        .collect();

    widget(
        "w3",
        vec![
            heading("w3-heading", "ACTIVE CLUSTERS"),
            json!({
                "id": "cluster-grid",
                "type": "Column",
                "props": { "style": {
                    "gap": 5, "width": 232, "height": 120, "justifyContent": "center", "alignItems": "center"
                } },
                "children": rows
            }),
            json!({
                "id": "cluster-legend",
                "type": "Row",
                "props": { "style": { "width": 232, "height": 40, "gap": 10, "alignItems": "center" } },
                "children": [
                    dot("cluster-online-dot".to_string(), "#10b981"),
                    text("cluster-online".to_string(), "18 Online", 80),
                    dot("cluster-offline-dot".to_string(), TRACK),
                    text("cluster-offline".to_string(), "6 Offline", 80)
                ]
            }),
            json!({
                "id": "cluster-load",
                "type": "Card",
                "props": { "style": {
                    "width": 232, "height": 50, "borderRadius": 12, "backgroundColor": "#202020", "padding": 10,
                    "flexDirection": "row", "alignItems": "center", "justifyContent": "space-between"
                } },
                "children": [
                    text("cluster-load-label".to_string(), "Total Load", 100),
                    text("cluster-load-value".to_string(), "4,203 TB", 80)
                ]
            }),
            action("w3-action", "MANAGE NODES", "nodes", "#ec4899"),
        ],
    )
}

/// `round(2.2 * percent)` in whole points.
fn bar_width(percent: u64) -> u64 {
    (percent * 22 + 5) / 10
}

fn surface_envelope(root: Value) -> Envelope {
    envelope(
        MessageKind::SurfaceUpdate,
        json!({ "surfaceId": SURFACE_ID, "root": root }),
    )
}

fn envelope(kind: MessageKind, payload: Value) -> Envelope {
    Envelope::new(kind, now_millis(), payload)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
        .unwrap_or_default()
}
