use kiln_cache::Context;
use kiln_common::{ResourceKey, ShaderStage};
use kiln_material::{BufferRegistry, ShaderResolver};
use kiln_reflect::{parse_shader_schema, Shader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const REFLECTION: &str = r#"{
    "types": {
        "_10": {
            "name": "StandardBlock",
            "members": [{ "name": "albedo", "type": "vec3", "offset": 0 }]
        }
    },
    "ubos": [
        { "type": "_10", "name": "standard", "block_size": 16, "set": 0, "binding": 0 }
    ]
}"#;

static NEXT_DIR: AtomicU32 = AtomicU32::new(0);

fn scratch_dir(name: &str) -> PathBuf {
    let unique = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "kiln-cache-test-{}-{name}-{unique}",
        std::process::id()
    ))
}

fn test_shader() -> Shader {
    Shader {
        stage: ShaderStage::Vertex,
        spirv: vec![0x03, 0x02, 0x23, 0x07],
        schema: parse_shader_schema(REFLECTION).unwrap(),
    }
}

#[test]
fn persisted_shaders_survive_a_fresh_context() {
    let root = scratch_dir("reload");
    let key = ResourceKey::from("vertex/shaders/basic");

    {
        let context = Context::new(&root).unwrap();
        context
            .shaders()
            .insert(&key, Arc::new(test_shader()), true)
            .unwrap();
    }

    let context = Context::new(&root).unwrap();
    let shader = context.resolve(&key).unwrap();
    assert_eq!(*shader, test_shader());

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn insert_without_overwrite_keeps_the_existing_record() {
    let root = scratch_dir("no-overwrite");
    let context = Context::new(&root).unwrap();
    let key = ResourceKey::from("vertex/shaders/basic");

    let first = context
        .shaders()
        .insert(&key, Arc::new(test_shader()), true)
        .unwrap();

    let mut replacement = test_shader();
    replacement.spirv.push(0xff);
    let kept = context
        .shaders()
        .insert(&key, Arc::new(replacement), false)
        .unwrap();

    assert!(Arc::ptr_eq(&first, &kept));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn get_or_create_returns_one_handle_per_key() {
    let root = scratch_dir("get-or-create");
    let context = Context::new(&root).unwrap();
    let schema = parse_shader_schema(REFLECTION).unwrap().buffers[0].clone();
    let key = ResourceKey::from("materials/rock/standard");

    let first = context.get_or_create(&key, &schema).unwrap();
    let second = context.get_or_create(&key, &schema).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn persisted_buffers_are_bit_identical_across_runs() {
    let schema = parse_shader_schema(REFLECTION).unwrap().buffers[0].clone();
    let key = ResourceKey::from("materials/rock/standard");

    let bake = |root: &PathBuf| {
        let context = Context::new(root).unwrap();
        let handle = context.buffers().get_or_create(&key, &schema);
        let values = serde_json::json!({ "albedo": [1.0, 0.5, 0.25] });
        let serde_json::Value::Object(values) = values else {
            unreachable!()
        };
        handle.write().apply_values(&values).unwrap();
        context.buffers().persist(&key).unwrap();
        std::fs::read(root.join("buffers").join(key.as_str())).unwrap()
    };

    let first_root = scratch_dir("idempotent-a");
    let second_root = scratch_dir("idempotent-b");
    assert_eq!(bake(&first_root), bake(&second_root));

    std::fs::remove_dir_all(&first_root).unwrap();
    std::fs::remove_dir_all(&second_root).unwrap();
}

#[test]
fn missing_records_report_not_found() {
    let root = scratch_dir("missing");
    let context = Context::new(&root).unwrap();
    let key = ResourceKey::from("vertex/shaders/absent");

    assert!(context.shaders().get(&key).is_err());
    assert!(context.resolve(&key).is_err());

    std::fs::remove_dir_all(&root).unwrap();
}
