use super::*;

#[test]
fn parse_digest_name() {
    assert!(ContentDigest::parse("balls").is_err());
    assert!(ContentDigest::parse("balls:0123456789abcdef0123456789abcdef").is_ok());
    assert!(ContentDigest::parse("-balls:0123456789abcdef0123456789abcdef").is_err());
    assert!(ContentDigest::parse("--balls:0123456789abcdef0123456789abcdef").is_err());
    assert!(
        ContentDigest::parse("b_b+b+b+b+b+b.balllllls:0123456789abcdef0123456789abcdef").is_ok()
    );
    assert!(
        ContentDigest::parse("b_b+b+b++b+b.balllllls:0123456789abcdef0123456789abcdef").is_err()
    );
    assert!(ContentDigest::parse("balls:0123456789abcdef0123456789abcdeg").is_err());
    assert!(ContentDigest::parse("balls:0123456789abcdef0123456789abcdeF").is_err());
    assert!(ContentDigest::parse("ball.ball.ball.balls:0123456789abcdef0123456789abcdef").is_ok());
    assert!(ContentDigest::parse("0123456789abcdef0123456789abcdef").is_err());
    assert!(ContentDigest::parse(":0123456789abcdef0123456789abcdef").is_err());
    assert!(ContentDigest::parse("balls:0123456789abcdef0123456789abcde").is_err());
    assert!(ContentDigest::parse("b9:0123456789abcdef0123456789abcdef").is_ok());
    assert!(ContentDigest::parse("9:0123456789abcdef0123456789abcdef").is_err());
    assert!(ContentDigest::parse(" balls:0123456789abcdef0123456789abcdef").is_err());
    assert!(ContentDigest::parse("balls:0123456789abcdef0123456789abcdef ").is_err());
    assert!(ContentDigest::parse("sha256:../../../etc/passwd0123456789abcdef0123456789").is_err());
}

#[test]
fn digest_parts() {
    let digest = ContentDigest::from_content(b"");
    assert_eq!(digest.format_str(), "sha256");
    assert_eq!(
        digest.hex_str(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(digest.algorithm().unwrap(), DigestAlgorithm::Sha256);
    assert_eq!(digest, digest.as_str().parse().unwrap());
}

#[test]
fn digest_algorithms() {
    assert!(ContentDigest::parse("md5:0123456789abcdef0123456789abcdef")
        .unwrap()
        .algorithm()
        .is_err());
    // right algorithm, wrong length
    assert!(ContentDigest::parse("sha256:0123456789abcdef0123456789abcdef")
        .unwrap()
        .algorithm()
        .is_err());
    let sha512 = format!("sha512:{}", "ab".repeat(64));
    assert_eq!(
        ContentDigest::parse(&sha512).unwrap().algorithm().unwrap(),
        DigestAlgorithm::Sha512
    );
}

#[test]
fn hasher_matches_from_content() {
    let mut hasher = DigestAlgorithm::Sha256.hasher();
    hasher.update(b"c");
    hasher.update(b"at");
    assert_eq!(hasher.finalize(), ContentDigest::from_content(b"cat"));

    let mut hasher = DigestAlgorithm::Sha512.hasher();
    hasher.update(b"cat");
    let digest = hasher.finalize();
    assert_eq!(digest.format_str(), "sha512");
    assert_eq!(digest.algorithm().unwrap(), DigestAlgorithm::Sha512);
}

#[test]
fn digest_json() {
    let digest = ContentDigest::from_content(b"cat");
    let json = serde_json::to_string(&digest).unwrap();
    assert_eq!(json, format!("\"{}\"", digest));
    assert_eq!(serde_json::from_str::<ContentDigest>(&json).unwrap(), digest);
    assert!(serde_json::from_str::<ContentDigest>("\"nope\"").is_err());
    assert!(serde_json::from_str::<ContentDigest>("42").is_err());
}

#[test]
fn media_type_round_trip() {
    for s in &[
        media_types::IMAGE_MANIFEST,
        media_types::IMAGE_INDEX,
        media_types::IMAGE_CONFIG,
        media_types::IMAGE_LAYER_GZIP,
        media_types::DOCKER_MANIFEST_LIST,
        "application/x-something-else",
    ] {
        let media_type: MediaType = s.parse().unwrap();
        assert_eq!(media_type.as_str(), *s);
        let json = serde_json::to_string(&media_type).unwrap();
        assert_eq!(serde_json::from_str::<MediaType>(&json).unwrap(), media_type);
    }
    assert_eq!(
        MediaType::parse("application/x-something-else"),
        MediaType::Other("application/x-something-else".to_owned())
    );
}
