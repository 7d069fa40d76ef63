//! Unit tests for shader.rs

use std::path::PathBuf;

use crate::error::Error;
use crate::resource::shader::*;

fn spirv_bytes(extra_words: &[u32]) -> Vec<u8> {
    let mut words = vec![SPIRV_MAGIC, 0x0001_0000, 0, 8, 0];
    words.extend_from_slice(extra_words);
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("morph_{}_{}", std::process::id(), name))
}

// ============================================================================
// FROM BYTES
// ============================================================================

#[test]
fn test_valid_module_is_accepted() {
    let code = ShaderCode::from_bytes(&spirv_bytes(&[42]), ShaderStage::Vertex).unwrap();
    assert_eq!(code.words.len(), 6);
    assert_eq!(code.words[0], SPIRV_MAGIC);
    assert_eq!(code.words[5], 42);
    assert_eq!(code.stage, ShaderStage::Vertex);
    assert_eq!(ShaderCode::ENTRY_POINT, "main");
}

#[test]
fn test_empty_code_is_rejected() {
    let result = ShaderCode::from_bytes(&[], ShaderStage::Fragment);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_unaligned_length_is_rejected() {
    let mut bytes = spirv_bytes(&[]);
    bytes.push(0);
    let result = ShaderCode::from_bytes(&bytes, ShaderStage::Fragment);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_bad_magic_is_rejected() {
    let bytes: Vec<u8> = [0xDEAD_BEEFu32, 0, 0, 0].iter().flat_map(|w| w.to_le_bytes()).collect();
    let result = ShaderCode::from_bytes(&bytes, ShaderStage::Vertex);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// LOAD
// ============================================================================

#[test]
fn test_missing_file_is_not_found() {
    let result = ShaderCode::load(temp_path("does_not_exist.spv"), ShaderStage::Vertex);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_load_from_disk() {
    let path = temp_path("frag.spv");
    std::fs::write(&path, spirv_bytes(&[1, 2, 3])).unwrap();

    let code = ShaderCode::load(&path, ShaderStage::Fragment);
    std::fs::remove_file(&path).unwrap();

    let code = code.unwrap();
    assert_eq!(code.words.len(), 8);
    assert_eq!(code.stage, ShaderStage::Fragment);
}

#[test]
fn test_load_empty_file_is_invalid() {
    let path = temp_path("empty.spv");
    std::fs::write(&path, b"").unwrap();

    let result = ShaderCode::load(&path, ShaderStage::Vertex);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(Error::InvalidResource(_))));
}
