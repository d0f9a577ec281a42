use std::io::Read;

use sniffer_signatures::member::{field_signature, method_signature};
use sniffer_signatures::{BaselineError, ClassSignature, SignatureIndex, SignatureWriter};
use tempfile::TempDir;

fn platform() -> Vec<ClassSignature> {
    vec![
        ClassSignature::new("java/lang/Object")
            .with_members([method_signature("<init>", "()V"), method_signature("hashCode", "()I")]),
        ClassSignature::new("java/util/List")
            .with_interfaces(["java/util/Collection"])
            .with_members([method_signature("size", "()I")]),
        ClassSignature::new("java/lang/System")
            .with_superclass("java/lang/Object")
            .with_members([field_signature("out", "Ljava/io/PrintStream;")]),
    ]
}

fn encode(classes: &[ClassSignature]) -> Vec<u8> {
    let mut writer = SignatureWriter::new(Vec::new()).unwrap();
    for class in classes {
        writer.write(class).unwrap();
    }
    assert_eq!(writer.written(), classes.len());
    writer.finish().unwrap()
}

#[test]
fn baseline_written_to_disk_loads_back() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("java18.sig");
    std::fs::write(&path, encode(&platform())).unwrap();

    let index = SignatureIndex::load_from_path(&path).unwrap();
    assert_eq!(index.len(), 3);

    let system = index.lookup("java/lang/System").unwrap();
    assert_eq!(system.superclass_name.as_deref(), Some("java/lang/Object"));
    assert!(system.declares("out#Ljava/io/PrintStream;"));
    assert!(!system.declares("out"));

    let list = index.lookup("java/util/List").unwrap();
    assert_eq!(list.superclass_name, None);
    assert_eq!(list.interface_names, vec!["java/util/Collection"]);
    assert_eq!(list.supertypes().collect::<Vec<_>>(), vec!["java/util/Collection"]);
}

#[test]
fn empty_baseline_is_valid() {
    let index = SignatureIndex::load(encode(&[]).as_slice()).unwrap();
    assert!(index.is_empty());
}

#[test]
fn duplicate_records_keep_the_later_one() {
    let first = ClassSignature::new("java/util/List").with_members(["size()I"]);
    let second = ClassSignature::new("java/util/List").with_members(["isEmpty()Z"]);
    let index = SignatureIndex::load(encode(&[first, second]).as_slice()).unwrap();

    assert_eq!(index.len(), 1);
    let list = index.lookup("java/util/List").unwrap();
    assert!(list.declares("isEmpty()Z"));
    assert!(!list.declares("size()I"));
}

#[test]
fn truncated_baseline_is_malformed() {
    let bytes = encode(&platform());
    // Cut inside the compressed payload.
    let err = SignatureIndex::load(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(err.is_malformed(), "{err:?}");
}

#[test]
fn uncompressed_input_is_malformed() {
    let err = SignatureIndex::load(&b"definitely not gzip"[..]).unwrap_err();
    assert!(err.is_malformed(), "{err:?}");
}

#[test]
fn missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = SignatureIndex::load_from_path(tmp.path().join("missing.sig")).unwrap_err();
    assert!(matches!(err, BaselineError::Io(_)));
    assert!(!err.is_malformed());
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "device went away",
        ))
    }
}

#[test]
fn read_failure_is_io_error() {
    let err = SignatureIndex::load(FailingReader).unwrap_err();
    assert!(matches!(err, BaselineError::Io(ref io) if io.kind() == std::io::ErrorKind::PermissionDenied));
}
