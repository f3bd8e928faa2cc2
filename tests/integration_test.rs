use std::fs;

use tempfile::tempdir;
use vnunpack::archive::ArchiveDecoder;
use vnunpack::encode::audio_to_wav;
use vnunpack::formats::leaf_lac::{LacArchiveDecoder, MAGIC};
use vnunpack::{
    default_registry, Audio, File, FileSaverCallback, FileSaverHdd, InputFile, UnpackOptions,
    Unpacker,
};

fn lac_fixture(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());
    let mut offset = 8 + 40 * files.len() as u32;
    for (name, data) in files {
        let mut field = [0xFFu8; 32];
        for (i, b) in name.bytes().enumerate() {
            field[i] = !b;
        }
        out.extend_from_slice(&field);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        offset += data.len() as u32;
    }
    for (_, data) in files {
        out.extend_from_slice(data);
    }
    out
}

fn sar_fixture(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut dir = Vec::new();
    let mut offset = 0u32;
    for (name, data) in files {
        dir.extend_from_slice(name.as_bytes());
        dir.push(0);
        dir.extend_from_slice(&offset.to_be_bytes());
        dir.extend_from_slice(&(data.len() as u32).to_be_bytes());
        offset += data.len() as u32;
    }
    let mut out = (files.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(&(6 + dir.len() as u32).to_be_bytes());
    out.extend_from_slice(&dir);
    for (_, data) in files {
        out.extend_from_slice(data);
    }
    out
}

fn collect(input: &mut InputFile, opts: UnpackOptions) -> Vec<File> {
    let registry = default_registry().unwrap();
    let mut files = Vec::new();
    let mut saver = FileSaverCallback::new(|f: File| files.push(f));
    let report = Unpacker::new(&registry, opts).unpack(input, &mut saver).unwrap();
    assert!(report.is_clean());
    drop(saver);
    files
}

#[test]
fn test_lac_two_phase_extraction() {
    let data = lac_fixture(&[("123.txt", b"1234567890"), ("abc.txt", b"abcdefghijklmnopqrstuvwxyz")]);
    let mut input = InputFile::from_bytes("test.lac", data);

    let decoder = LacArchiveDecoder;
    let meta = decoder.read_meta(&mut input).unwrap();
    assert_eq!(meta.len(), 2);
    assert_eq!(meta.entries[0].path, "123.txt");
    assert_eq!(meta.entries[1].path, "abc.txt");

    let second = decoder.read_file(&mut input, &meta, &meta.entries[1]).unwrap();
    let first = decoder.read_file(&mut input, &meta, &meta.entries[0]).unwrap();
    assert_eq!(first.content, b"1234567890");
    assert_eq!(second.content, b"abcdefghijklmnopqrstuvwxyz");
}

#[test]
fn test_lac_auto_detected() {
    let data = lac_fixture(&[("123.txt", b"1234567890"), ("abc.txt", b"abcdefghijklmnopqrstuvwxyz")]);
    let mut input = InputFile::from_bytes("whatever.bin", data);
    let files = collect(&mut input, UnpackOptions::default());
    let names: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(names, vec!["123.txt", "abc.txt"]);
}

#[test]
fn test_sar_archive() {
    let data = sar_fixture(&[("abc.txt", b"123"), ("dir\\another.txt", &[b'A'; 16])]);
    let mut input = InputFile::from_bytes("arc.sar", data);
    let files = collect(&mut input, UnpackOptions::default());
    assert_eq!(files.len(), 2);
    assert_eq!(files[0], File::new("abc.txt", b"123".to_vec()));
    assert_eq!(files[1], File::new("dir/another.txt", vec![b'A'; 16]));
}

#[test]
fn test_spb_through_pipeline() {
    // 1x1: three literal seeds, nothing else.
    let data = vec![0x00, 0x01, 0x00, 0x01, 0x10, 0x20, 0x30];
    let mut input = InputFile::from_bytes("pic.bmp", data);
    let files = collect(&mut input, UnpackOptions::default());
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "pic.bmp");
    assert_eq!(&files[0].content[..2], b"BM");
    assert_eq!(&files[0].content[54..], &[0x10, 0x20, 0x30, 0xFF]);
}

#[test]
fn test_koe_all_extensions() {
    let audio = Audio {
        channels:        2,
        sample_rate:     44100,
        bits_per_sample: 16,
        samples:         (0..1000u32).map(|i| (i % 251) as u8).collect(),
    };
    let plain = audio_to_wav(&audio, "ref").unwrap();

    for ext in ["bgm", "koe", "mse"] {
        let path = format!("voice.{ext}");
        // Obfuscate by decoding the plain WAV through KOE: the XOR is its own inverse.
        let mut input = InputFile::from_bytes(&path, plain.content.clone());
        let opts = UnpackOptions { format: Some("mebius/koe".into()), plugin: Some("snow".into()) };
        let scrambled = collect(&mut input, opts).remove(0);
        assert_ne!(scrambled.content, plain.content);

        let mut input = InputFile::from_bytes(&path, scrambled.content);
        let files = collect(&mut input, UnpackOptions { format: None, plugin: Some("snow".into()) });
        assert_eq!(files[0].path, "voice.wav");
        assert_eq!(files[0].content, plain.content, "{ext}");
    }
}

#[test]
fn test_plain_wav_passthrough() {
    let audio = Audio { channels: 1, sample_rate: 8000, bits_per_sample: 8, samples: vec![1, 2, 3, 4] };
    let plain = audio_to_wav(&audio, "a").unwrap();
    let mut input = InputFile::from_bytes("a.wav", plain.content.clone());
    let files = collect(&mut input, UnpackOptions::default());
    assert_eq!(files, vec![plain]);
}

#[test]
fn test_unrecognized_input() {
    let registry = default_registry().unwrap();
    let mut input = InputFile::from_bytes("noise.dat", vec![0x42; 64]);
    let mut saver = FileSaverCallback::new(|_: File| panic!("nothing should be saved"));
    let err = Unpacker::new(&registry, UnpackOptions::default())
        .unpack(&mut input, &mut saver)
        .unwrap_err();
    assert!(matches!(err, vnunpack::Error::UnrecognizedFormat));
}

#[test]
fn test_unpack_file_to_directory() {
    let data = sar_fixture(&[("abc.txt", b"123"), ("../dir\\another.txt", &[b'A'; 16])]);
    let work = tempdir().unwrap();
    let sar_path = work.path().join("test.sar");
    fs::write(&sar_path, &data).unwrap();

    let out = tempdir().unwrap();
    let registry = default_registry().unwrap();
    let mut saver = FileSaverHdd::new(out.path(), false);
    let mut input = InputFile::open(&sar_path).unwrap();
    let report = Unpacker::new(&registry, UnpackOptions::default())
        .unpack(&mut input, &mut saver)
        .unwrap();

    assert_eq!(report.format, "nscripter/sar");
    assert_eq!(report.saved, 2);
    assert_eq!(fs::read(out.path().join("abc.txt")).unwrap(), b"123");
    assert_eq!(fs::read(out.path().join("dir/another.txt")).unwrap(), vec![b'A'; 16]);
}

#[test]
fn test_list_reports_directory() {
    let data = lac_fixture(&[("a.txt", b"x"), ("b.txt", b"yz")]);
    let mut input = InputFile::from_bytes("x.lac", data);
    let registry = default_registry().unwrap();
    let (id, meta) = Unpacker::new(&registry, UnpackOptions::default()).list(&mut input).unwrap();
    assert_eq!(id, "leaf/lac");
    let json = serde_json::to_string(&meta).unwrap();
    assert_eq!(
        json,
        r#"{"entries":[{"path":"a.txt","offset":88,"size":1},{"path":"b.txt","offset":89,"size":2}]}"#
    );
}
