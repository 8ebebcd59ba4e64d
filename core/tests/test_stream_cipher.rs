#[cfg(test)]
mod tests {
    use bulkcrypt_core::crypto::{Algorithm, CipherSpec, CryptoError, Mode, StreamCipher};
    use proptest::prelude::*;
    use rand::RngCore;

    fn key_for(alg: Algorithm) -> Vec<u8> {
        (0..alg.key_size() as u8).map(|b| b.wrapping_mul(7).wrapping_add(3)).collect()
    }

    fn run(alg: Algorithm, mode: Mode, key: &[u8], input: &[u8], chunk: usize) -> Result<Vec<u8>, CryptoError> {
        let spec = CipherSpec::new(alg, mode, key)?;
        let mut cipher = StreamCipher::new(&spec)?;
        let mut out = Vec::new();
        let chunks: Vec<&[u8]> = input.chunks(chunk.max(1)).collect();
        for c in &chunks {
            out.extend(cipher.update(c, false)?);
        }
        out.extend(cipher.update(&[], true)?);
        assert_eq!(cipher.carry_len(), 0);
        Ok(out)
    }

    fn random_bytes(len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut buf);
        buf
    }

    #[test]
    fn round_trip_edge_lengths_every_algorithm() {
        for alg in Algorithm::ALL {
            let key = key_for(alg);
            let bs = alg.block_size();
            for len in [0, 1, bs - 1, bs, bs + 1, 3 * bs + 5] {
                let plain = random_bytes(len);
                let ct = run(alg, Mode::Encrypt, &key, &plain, 7).unwrap();
                assert_eq!(ct.len(), (len / bs + 1) * bs, "{alg} len={len}");
                let back = run(alg, Mode::Decrypt, &key, &ct, 5).unwrap();
                assert_eq!(back, plain, "{alg} len={len}");
            }
        }
    }

    #[test]
    fn round_trip_several_megabytes() {
        let plain = random_bytes(3 * 1024 * 1024 + 11);
        let key = key_for(Algorithm::Aes256);
        let ct = run(Algorithm::Aes256, Mode::Encrypt, &key, &plain, 64 * 1024).unwrap();
        let back = run(Algorithm::Aes256, Mode::Decrypt, &key, &ct, 64 * 1024).unwrap();
        assert_eq!(back, plain);
    }

    #[test]
    fn aes128_known_answer_first_block() {
        let key: Vec<u8> = (0u8..16).collect();
        let plain = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let ct = run(Algorithm::Aes128, Mode::Encrypt, &key, &plain, 16).unwrap();
        assert_eq!(ct.len(), 32);
        assert_eq!(&ct[..16], hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap().as_slice());
    }

    #[test]
    fn encrypt_empty_is_one_padding_block() {
        for alg in Algorithm::ALL {
            let ct = run(alg, Mode::Encrypt, &key_for(alg), &[], 16).unwrap();
            assert_eq!(ct.len(), alg.block_size());
        }
    }

    #[test]
    fn decrypt_empty_is_empty() {
        let out = run(Algorithm::Des, Mode::Decrypt, &key_for(Algorithm::Des), &[], 16).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn decrypt_holds_back_last_block_until_final() {
        let key = key_for(Algorithm::Aes128);
        let ct = run(Algorithm::Aes128, Mode::Encrypt, &key, &[0x42; 40], 64).unwrap();
        assert_eq!(ct.len(), 48);

        let spec = CipherSpec::new(Algorithm::Aes128, Mode::Decrypt, &key).unwrap();
        let mut cipher = StreamCipher::new(&spec).unwrap();
        let first = cipher.update(&ct, false).unwrap();
        assert_eq!(first.len(), 32);
        assert_eq!(cipher.carry_len(), 16);
        let last = cipher.update(&[], true).unwrap();
        assert_eq!(last, vec![0x42; 8]);
    }

    #[test]
    fn encrypt_keeps_partial_block_in_carry() {
        let key = key_for(Algorithm::TripleDes);
        let spec = CipherSpec::new(Algorithm::TripleDes, Mode::Encrypt, &key).unwrap();
        let mut cipher = StreamCipher::new(&spec).unwrap();
        assert!(cipher.update(&[1, 2, 3], false).unwrap().is_empty());
        assert_eq!(cipher.carry_len(), 3);
        assert_eq!(cipher.update(&[4, 5, 6, 7, 8, 9], false).unwrap().len(), 8);
        assert_eq!(cipher.carry_len(), 1);
    }

    #[test]
    fn bad_padding_fails_and_clears_carry() {
        let key = key_for(Algorithm::Aes128);
        let ct = run(Algorithm::Aes128, Mode::Encrypt, &key, b"hello world", 64).unwrap();
        let wrong: Vec<u8> = key.iter().map(|b| b ^ 0xFF).collect();

        let spec = CipherSpec::new(Algorithm::Aes128, Mode::Decrypt, &wrong).unwrap();
        let mut cipher = StreamCipher::new(&spec).unwrap();
        cipher.update(&ct, false).unwrap();
        let err = cipher.update(&[], true);
        // Garbage plaintext still ends in valid padding about 1 time in 256.
        if let Err(e) = err {
            assert!(matches!(e, CryptoError::TransformFailure(_)));
        }
        assert_eq!(cipher.carry_len(), 0);
    }

    #[test]
    fn tampered_padding_is_rejected() {
        let key = key_for(Algorithm::Des);
        let spec = CipherSpec::new(Algorithm::Des, Mode::Decrypt, &key).unwrap();
        let mut enc = StreamCipher::new(&CipherSpec::new(Algorithm::Des, Mode::Encrypt, &key).unwrap()).unwrap();

        // Encrypt a raw block ending in 0x00 without padding, then ask to unpad it.
        let raw = enc.update(&[9, 9, 9, 9, 9, 9, 9, 0], false).unwrap();
        assert_eq!(raw.len(), 8);
        let mut dec = StreamCipher::new(&spec).unwrap();
        assert!(dec.update(&raw, false).unwrap().is_empty());
        let err = dec.update(&[], true).unwrap_err();
        assert!(err.to_string().contains("bad padding"));
        assert_eq!(dec.carry_len(), 0);
    }

    #[test]
    fn illegal_block_size_on_decrypt() {
        let key = key_for(Algorithm::Aes192);
        let spec = CipherSpec::new(Algorithm::Aes192, Mode::Decrypt, &key).unwrap();
        let mut cipher = StreamCipher::new(&spec).unwrap();
        cipher.update(&[0u8; 20], false).unwrap();
        let err = cipher.update(&[], true).unwrap_err();
        assert!(err.to_string().contains("illegal block size"));
        assert_eq!(cipher.carry_len(), 0);
    }

    #[test]
    fn invalid_key_size_is_rejected() {
        let err = CipherSpec::new(Algorithm::Aes256, Mode::Encrypt, &[0u8; 16]).unwrap_err();
        assert_eq!(err, CryptoError::InvalidKeySize { expected: 32, actual: 16 });
    }

    #[test]
    fn algorithm_parsing() {
        assert_eq!("aes-128".parse::<Algorithm>().unwrap(), Algorithm::Aes128);
        assert_eq!("3DES".parse::<Algorithm>().unwrap(), Algorithm::TripleDes);
        assert_eq!("4".parse::<Algorithm>().unwrap(), Algorithm::Des);
        assert!("rc4".parse::<Algorithm>().is_err());
        assert!(Algorithm::from_menu_number(6).is_err());
        assert_eq!(Algorithm::Aes192.menu_number(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn chunking_does_not_change_output(
            data in proptest::collection::vec(any::<u8>(), 0..600),
            chunk in 1usize..70,
        ) {
            for alg in [Algorithm::Aes128, Algorithm::Des] {
                let key = key_for(alg);
                let whole = run(alg, Mode::Encrypt, &key, &data, data.len().max(1)).unwrap();
                let split = run(alg, Mode::Encrypt, &key, &data, chunk).unwrap();
                prop_assert_eq!(&whole, &split);

                let back = run(alg, Mode::Decrypt, &key, &split, chunk).unwrap();
                prop_assert_eq!(back, data.clone());
            }
        }
    }
}
