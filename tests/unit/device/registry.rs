use super::*;

#[test]
fn builtin_devices_are_registered() {
    let reg = DeviceRegistry::builtin();
    assert_eq!(reg.ids().collect::<Vec<_>>(), vec!["iphone", "laptop"]);

    let iphone = reg.get("iphone").unwrap();
    assert_eq!(iphone.name, "iPhone");
    assert_eq!((iphone.frame_width, iphone.frame_height), (1212, 2487));
    let screen = iphone.screen_rect();
    assert_eq!((screen.x0, screen.y0), (48.0, 40.0));
    assert_eq!((screen.width(), screen.height()), (1116.0, 2407.0));

    let laptop = reg.get("laptop").unwrap();
    assert_eq!((laptop.screen_x, laptop.screen_y), (968, 627));
}

#[test]
fn unknown_device_is_an_error() {
    let reg = DeviceRegistry::builtin();
    let err = reg.get("tablet").unwrap_err();
    assert!(matches!(err, MockupError::UnknownDevice(ref id) if id == "tablet"));
    assert!(!reg.contains("tablet"));
}

#[test]
fn cutout_must_be_inside_frame() {
    let mut bad = builtin_devices().remove(0);
    bad.screen_x = 100;
    let err = DeviceRegistry::new().insert(bad).unwrap_err();
    assert!(err.to_string().contains("exceeds frame"));

    let mut empty = builtin_devices().remove(0);
    empty.screen_height = 0;
    assert!(DeviceRegistry::new().insert(empty).is_err());
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut reg = DeviceRegistry::builtin();
    let again = builtin_devices().remove(1);
    assert!(reg.insert(again).is_err());
    assert_eq!(reg.len(), 2);
}

#[test]
fn json_registry_normalizes_overlay_paths() {
    let json = r#"[
        {
            "id": "watch",
            "name": "Watch",
            "overlay": "frames\\watch.png",
            "frame_width": 400,
            "frame_height": 480,
            "screen_x": 40,
            "screen_y": 60,
            "screen_width": 320,
            "screen_height": 360
        }
    ]"#;
    let reg = DeviceRegistry::from_json_str(json).unwrap();
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.get("watch").unwrap().overlay, "frames/watch.png");
}

#[test]
fn json_registry_rejects_escaping_overlays_and_bad_json() {
    let json = r#"[{"id":"x","name":"X","overlay":"../x.png","frame_width":10,"frame_height":10,
        "screen_x":0,"screen_y":0,"screen_width":5,"screen_height":5}]"#;
    assert!(DeviceRegistry::from_json_str(json).is_err());

    let err = DeviceRegistry::from_json_str("{").unwrap_err();
    assert!(matches!(err, MockupError::Serde(_)));
}
