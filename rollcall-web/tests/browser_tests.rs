#![cfg(target_arch = "wasm32")]

use rollcall_core::constants::STORAGE_KEY;
use rollcall_core::{ConfigStorage, decode};
use rollcall_web::Rollcall;
use rollcall_web::dom;
use rollcall_web::platform::LocalStorageSlot;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn reset_slot() {
    dom::local_storage()
        .expect("localStorage")
        .remove_item(STORAGE_KEY)
        .expect("clear slot");
}

#[wasm_bindgen_test]
fn local_storage_slot_round_trips_text() {
    let slot = LocalStorageSlot;
    slot.set("rollcall-test-slot", "hello 世界").expect("set");
    assert_eq!(
        slot.get("rollcall-test-slot").expect("get").as_deref(),
        Some("hello 世界")
    );
}

#[wasm_bindgen_test]
fn adding_an_entry_persists_to_local_storage() {
    reset_slot();
    let rollcall = Rollcall::new();
    let id = rollcall.add_entry("Alice", Some(0.0));

    let saved = LocalStorageSlot.get(STORAGE_KEY).expect("get").expect("saved");
    let entries = decode(&saved).expect("decode").entries.expect("entries");
    assert_eq!(entries[0].id, id);
    assert!((entries[0].weight - 0.1).abs() < f64::EPSILON);

    let reopened = Rollcall::new();
    let snapshot = reopened.snapshot().expect("snapshot");
    let entries = js_sys::Reflect::get(&snapshot, &JsValue::from_str("entries")).expect("entries");
    assert_eq!(js_sys::Array::from(&entries).length(), 1);
}

#[wasm_bindgen_test]
async fn pick_resolves_with_the_only_entry() {
    reset_slot();
    let rollcall = Rollcall::new();
    rollcall.add_entry("Solo", None);

    let picked = JsFuture::from(rollcall.pick()).await.expect("pick resolves");
    let name = js_sys::Reflect::get(&picked, &JsValue::from_str("name")).expect("name");
    assert_eq!(name.as_string().as_deref(), Some("Solo"));
    assert!(!rollcall.is_picking());

    let refused = JsFuture::from(rollcall.pick()).await.expect("pick resolves");
    assert!(refused.is_null());
}
