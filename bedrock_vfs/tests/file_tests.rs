// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end scenarios for the virtual file layer: the canonical raw/data
//! fixtures, write-back round trips, custom handler registration, the
//! cipher pipeline and zip access in both stored and deflated forms.

use bedrock_core::compression::CompressionType;
use bedrock_core::{Error, Result};
use bedrock_vfs::cipher::create_iv;
use bedrock_vfs::{
    generate_raw_filename, AesCtrCipher, ContentCipher, FileHandler, OpenFlags, OpenedHandler,
    PipelinedRequest, SeekWhence, Vfs,
};

const QBF_TEXT: &[u8] = b"The quick brown fox jumps over the lazy dog";
const QBF_UNCOMP: &str = "raw://VGhlIHF1aWNrIGJyb3duIGZveCBqdW1wcyBvdmVyIHRoZSBsYXp5IGRvZw==";
const QBF_RAW_DEFLATE: &str =
    "raw://compression=RawDeflate,size=43@C8lIVSgszUzOVkgqyi/PU0jLr1DIKs0tKFbIL0stUigBSuckVlUqpOSnAwA=";
const QBF_GZIP_DEFLATE: &str =
    "raw://compression=GzipDeflate,size=43@H4sIAAAAAAAA/wvJSFUoLM1MzlZIKsovz1NIy69QyCrNLShWyC9LLVIoAUrnJFZVKqTkpwMAOaNPQSsAAAA=";
const QBF_ZLIB_DEFLATE: &str =
    "raw://compression=ZlibDeflate,size=43@eJwLyUhVKCzNTM5WSCrKL89TSMuvUMgqzS0oVsgvSy1SKAFK5yRWVSqk5KcDAFvcD9o=";
const QBF_DATA_BASE64: &str =
    "data:text/plain;base64,VGhlIHF1aWNrIGJyb3duIGZveCBqdW1wcyBvdmVyIHRoZSBsYXp5IGRvZw==";

/// The four raw fixtures all load the same 43 bytes.
#[test]
fn raw_load_fixtures() {
    let vfs = Vfs::new();

    let hello = vfs.load("raw://SGVsbG8gV29ybGQ=").unwrap();
    assert_eq!(hello.len(), 11);
    assert_eq!(hello, b"Hello World");

    for fixture in [QBF_UNCOMP, QBF_RAW_DEFLATE, QBF_GZIP_DEFLATE, QBF_ZLIB_DEFLATE] {
        let data = vfs.load(fixture).unwrap();
        assert_eq!(data.len(), 43, "{fixture}");
        assert_eq!(data, QBF_TEXT, "{fixture}");
    }
}

#[test]
fn data_uri_fixtures() {
    let vfs = Vfs::new();

    let hello = vfs.load("data:,Hello%20World").unwrap();
    assert_eq!(hello.len(), 11);
    assert_eq!(hello, b"Hello World");

    let qbf = vfs.load(QBF_DATA_BASE64).unwrap();
    assert_eq!(qbf, QBF_TEXT);
}

/// Raw write-back: generate an empty writable URI, write, close, reload
/// the regenerated URI, for every compression mode.
#[test]
fn raw_write_round_trip() {
    let vfs = Vfs::new();

    // A fixture without an allocationSize cannot be opened for write.
    assert_eq!(
        vfs.open(QBF_UNCOMP, OpenFlags::WRITE).unwrap_err(),
        Error::OpenFailure
    );

    for ct in CompressionType::ALL {
        let template = generate_raw_filename(&[], ct, Some("QBF Test"), 256).unwrap();

        let mut file = vfs.open(&template, OpenFlags::WRITE).unwrap();
        assert_eq!(file.filename(), template);
        assert_eq!(file.file_length(), 0);

        let written = file.seek_write(QBF_TEXT, 0, SeekWhence::Set).unwrap();
        assert_eq!(written, QBF_TEXT.len());

        let regenerated = file.close().unwrap().expect("writable raw returns its new name");
        let reloaded = vfs.load(&regenerated).unwrap();
        assert_eq!(reloaded, QBF_TEXT, "{ct:?}");
    }

    // A too-small declared allocation surfaces at close.
    let tiny = generate_raw_filename(&[], CompressionType::ZlibDeflate, Some("tiny"), 100).unwrap();
    let mut file = vfs.open(&tiny, OpenFlags::WRITE).unwrap();
    file.seek_write(QBF_TEXT, 0, SeekWhence::Set).unwrap();
    assert_eq!(file.close().unwrap_err(), Error::BufferTooSmall);
}

#[test]
fn raw_sparse_writes_zero_fill() {
    let vfs = Vfs::new();
    let template = generate_raw_filename(&[], CompressionType::None, None, 128).unwrap();

    let mut file = vfs.open(&template, OpenFlags::WRITE).unwrap();
    file.seek_write(b"end", 8, SeekWhence::Set).unwrap();
    let regenerated = file.close().unwrap().unwrap();

    let data = vfs.load(&regenerated).unwrap();
    assert_eq!(&data[..8], &[0u8; 8]);
    assert_eq!(&data[8..], b"end");
}

// ----------------------------------------------------------------------
// Custom handler registration
// ----------------------------------------------------------------------

static CUSTOM_STORE: parking_lot::Mutex<Vec<u8>> = parking_lot::Mutex::new(Vec::new());

struct CustomHandler;

impl FileHandler for CustomHandler {
    fn read(&mut self, buf: &mut [u8], offset: i64, _request: Option<&mut PipelinedRequest>) -> Result<usize> {
        let store = CUSTOM_STORE.lock();
        let offset = offset as usize;
        if offset >= store.len() {
            return Ok(0);
        }
        let actual = buf.len().min(store.len() - offset);
        buf[..actual].copy_from_slice(&store[offset..offset + actual]);
        Ok(actual)
    }

    fn write(&mut self, buf: &[u8], _offset: i64) -> Result<usize> {
        let mut store = CUSTOM_STORE.lock();
        store.clear();
        store.extend_from_slice(buf);
        Ok(buf.len())
    }
}

fn custom_open(_vfs: &Vfs, _filename: &str, _flags: OpenFlags) -> Result<OpenedHandler> {
    Ok(OpenedHandler::new(Box::new(CustomHandler), 0))
}

/// A handler registered at runtime answers its prefix until deregistered.
#[test]
fn custom_handler_lifecycle() {
    let vfs = Vfs::new();
    vfs.register("CUSTOM:", custom_open).unwrap();

    let name = "CUSTOM://scratch";
    let payload = b"Testing!";

    let mut file = vfs.open(name, OpenFlags::WRITE).unwrap();
    file.seek_write_full(payload, 0, SeekWhence::Set).unwrap();
    file.close().unwrap();

    // Unknown length exercises the chunked generic load.
    assert_eq!(vfs.load(name).unwrap(), payload);

    vfs.deregister(custom_open).unwrap();
    assert_eq!(vfs.open(name, OpenFlags::WRITE).unwrap_err(), Error::OpenFailure);
}

// ----------------------------------------------------------------------
// Cipher pipeline
// ----------------------------------------------------------------------

/// CTR-encrypted content written out of band reads back as plaintext once
/// the key is installed; a wrong key yields different bytes.
#[test]
fn encrypted_read_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cipher.bin");
    let path = path.to_str().unwrap();
    let vfs = Vfs::new();

    let plain = b"Testing!asdfasdfasdfasdfasdfasd"; // 31 bytes, unaligned tail
    let key = [0x5au8; 32];
    let nonce = 12u64;

    let mut encrypted = plain.to_vec();
    AesCtrCipher::new(&key)
        .unwrap()
        .apply_keystream(&create_iv(nonce, 0), &mut encrypted)
        .unwrap();
    vfs.save(path, &encrypted).unwrap();

    // Without the key the bytes are gibberish.
    let mut file = vfs.open(path, OpenFlags::READ).unwrap();
    let mut raw = vec![0u8; plain.len()];
    file.seek_read_full(&mut raw, 0, SeekWhence::Set).unwrap();
    assert_ne!(raw.as_slice(), plain);

    // With the key installed the pipeline decrypts in place.
    file.set_encryption(&key, nonce, 0).unwrap();
    let mut decrypted = vec![0u8; plain.len()];
    file.seek_read_full(&mut decrypted, 0, SeekWhence::Set).unwrap();
    assert_eq!(decrypted.as_slice(), plain);

    // An unaligned interior read still lines up with the keystream.
    let mut middle = [0u8; 10];
    file.seek_read_full(&mut middle, 17, SeekWhence::Set).unwrap();
    assert_eq!(&middle, &plain[17..27]);
    file.close().unwrap();

    // A wrong key decrypts to something else.
    let mut file = vfs.open(path, OpenFlags::READ).unwrap();
    file.set_encryption(&[0xa5u8; 32], nonce, 0).unwrap();
    let mut wrong = vec![0u8; plain.len()];
    file.seek_read_full(&mut wrong, 0, SeekWhence::Set).unwrap();
    assert_ne!(wrong.as_slice(), plain);
    file.close().unwrap();

    // Encryption is a read-side capability only.
    let mut writable = vfs.open(path, OpenFlags::WRITE).unwrap();
    assert_eq!(writable.set_encryption(&key, nonce, 0).unwrap_err(), Error::InvalidConfiguration);
}

// ----------------------------------------------------------------------
// Zip access
// ----------------------------------------------------------------------

// A two-entry stored archive ("Doc1.txt"/"Doc2.txt") embedded as a raw URI.
const STORED_ZIP: &str = "zip://raw://UEsDBBQAAAAAABZZRk00AiXKDwAAAA8AAAAIAAAARG9jMS50eHRIZWxsbyB3b3JsZCAxDQpQSwMEFAAAAAAAGFlGTW28Y8gPAAAADwAAAAgAAABEb2MyLnR4dEhlbGxvIHdvcmxkIDINClBLAQIUABQAAAAAABZZRk00AiXKDwAAAA8AAAAIAAAAAAAAAAEAIAAAAAAAAABEb2MxLnR4dFBLAQIUABQAAAAAABhZRk1tvGPIDwAAAA8AAAAIAAAAAAAAAAEAIAAAADUAAABEb2MyLnR4dFBLBQYAAAAAAgACAGwAAABqAAAAAAA=";

/// The stored archive: listing first, then both entries through the
/// seek-base fast path.
#[test]
fn zip_stored_archive() {
    let vfs = Vfs::new();

    let toc = vfs.load(STORED_ZIP).unwrap();
    let names: Vec<&str> = std::str::from_utf8(&toc)
        .unwrap()
        .split('\n')
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(names, ["Doc1.txt", "Doc2.txt"]);

    for (name, expected) in [("Doc1.txt", "Hello world 1\r\n"), ("Doc2.txt", "Hello world 2\r\n")] {
        let doc = vfs.load(&format!("{STORED_ZIP}:{name}")).unwrap();
        assert_eq!(doc, expected.as_bytes(), "{name}");
    }

    // Random access inside a stored entry goes through the outer file.
    let mut file = vfs.open(&format!("{STORED_ZIP}:Doc2.txt"), OpenFlags::READ).unwrap();
    let mut world = [0u8; 5];
    file.seek_read_full(&mut world, 6, SeekWhence::Set).unwrap();
    assert_eq!(&world, b"world");
    file.close().unwrap();

    assert_eq!(
        vfs.open(&format!("{STORED_ZIP}:Doc3.txt"), OpenFlags::READ).unwrap_err(),
        Error::OpenFailure
    );
}

// Builds a single-entry deflated archive in memory.
fn build_deflated_zip(name: &str, data: &[u8]) -> Vec<u8> {
    let deflated = bedrock_core::compression::deflate(data, CompressionType::RawDeflate).unwrap();
    let crc = crc32fast::hash(data);

    let mut zip = Vec::new();
    let push_u16 = |zip: &mut Vec<u8>, v: u16| zip.extend_from_slice(&v.to_le_bytes());
    let push_u32 = |zip: &mut Vec<u8>, v: u32| zip.extend_from_slice(&v.to_le_bytes());

    // Local file header.
    push_u32(&mut zip, 0x0403_4b50);
    push_u16(&mut zip, 20); // version needed
    push_u16(&mut zip, 0); // flags
    push_u16(&mut zip, 8); // method: deflate
    push_u16(&mut zip, 0); // time
    push_u16(&mut zip, 0); // date
    push_u32(&mut zip, crc);
    push_u32(&mut zip, deflated.len() as u32);
    push_u32(&mut zip, data.len() as u32);
    push_u16(&mut zip, name.len() as u16);
    push_u16(&mut zip, 0); // extra
    zip.extend_from_slice(name.as_bytes());
    zip.extend_from_slice(&deflated);

    // Central directory.
    let central_offset = zip.len() as u32;
    push_u32(&mut zip, 0x0201_4b50);
    push_u16(&mut zip, 20); // version made by
    push_u16(&mut zip, 20); // version needed
    push_u16(&mut zip, 0); // flags
    push_u16(&mut zip, 8); // method
    push_u16(&mut zip, 0); // time
    push_u16(&mut zip, 0); // date
    push_u32(&mut zip, crc);
    push_u32(&mut zip, deflated.len() as u32);
    push_u32(&mut zip, data.len() as u32);
    push_u16(&mut zip, name.len() as u16);
    push_u16(&mut zip, 0); // extra
    push_u16(&mut zip, 0); // comment
    push_u16(&mut zip, 0); // disk
    push_u16(&mut zip, 0); // internal attrs
    push_u32(&mut zip, 0); // external attrs
    push_u32(&mut zip, 0); // local header offset
    zip.extend_from_slice(name.as_bytes());
    let central_size = zip.len() as u32 - central_offset;

    // End of central directory.
    push_u32(&mut zip, 0x0605_4b50);
    push_u16(&mut zip, 0); // disk
    push_u16(&mut zip, 0); // cd disk
    push_u16(&mut zip, 1); // entries on disk
    push_u16(&mut zip, 1); // entries total
    push_u32(&mut zip, central_size);
    push_u32(&mut zip, central_offset);
    push_u16(&mut zip, 0); // comment length
    zip
}

/// A deflated entry decompresses on a background task; reads block until
/// their range is available and the whole entry round-trips.
#[test]
fn zip_deflated_entry() {
    let vfs = Vfs::new();

    // Patterned payload, large enough to take several inflater chunks.
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 251) as u8).collect();
    let archive = build_deflated_zip("big/blob.bin", &payload);
    let archive_uri = format!("zip://{}", generate_raw_filename(&archive, CompressionType::None, None, 0).unwrap());

    let entry = vfs.load(&format!("{archive_uri}:big/blob.bin")).unwrap();
    assert_eq!(entry, payload);

    // Path separator tolerance: the archive stores '/', the caller asks
    // with '\'.
    let entry = vfs.load(&format!("{archive_uri}:big\\blob.bin")).unwrap();
    assert_eq!(entry, payload);

    // Interior random access waits for the inflater to catch up.
    let mut file = vfs.open(&format!("{archive_uri}:big/blob.bin"), OpenFlags::READ).unwrap();
    let mut tail = vec![0u8; 4096];
    file.seek_read_full(&mut tail, payload.len() as i64 - 4096, SeekWhence::Set).unwrap();
    assert_eq!(tail.as_slice(), &payload[payload.len() - 4096..]);
    file.close().unwrap();
}

/// `set_sub_filename` re-targets an open archive without reopening it.
#[test]
fn zip_switch_subfile() {
    let vfs = Vfs::new();

    let mut file = vfs.open(STORED_ZIP, OpenFlags::READ).unwrap();
    let listing_length = file.file_length();
    assert!(listing_length > 0);

    let length = file.set_sub_filename(Some("Doc1.txt")).unwrap();
    assert_eq!(length, 15);
    assert_eq!(file.load().unwrap(), b"Hello world 1\r\n");

    let length = file.set_sub_filename(Some("Doc2.txt")).unwrap();
    assert_eq!(length, 15);
    assert_eq!(file.load().unwrap(), b"Hello world 2\r\n");

    // Unsetting leaves no entry exposed.
    assert_eq!(file.set_sub_filename(None).unwrap(), 0);
    assert_eq!(file.file_length(), 0);
    file.close().unwrap();

    // Writing into archives is not a thing.
    assert_eq!(vfs.open(STORED_ZIP, OpenFlags::WRITE).unwrap_err(), Error::OpenFailure);
}

/// `set_sub_filename` on a non-archive handler reports the missing
/// capability.
#[test]
fn sub_filename_needs_an_archive() {
    let vfs = Vfs::new();
    let mut file = vfs.open("data:,plain", OpenFlags::READ).unwrap();
    assert_eq!(file.set_sub_filename(Some("x")).unwrap_err(), Error::InvalidConfiguration);
}
