// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation with per-class guarantees.
//!
//! Characters are picked from bytes drawn from the system CSPRNG. One byte per
//! enabled class (uppercase, lowercase, digits, symbols, in that order) selects
//! a guaranteed member of that class; the remaining bytes select from the
//! union of enabled classes minus excluded characters. The assembled password
//! is then shuffled with the OS RNG.

use std::collections::BTreeSet;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::SecretString;
use strongbox_config::model::GeneratorConfig;
use strongbox_core::StrongboxError;
use zeroize::Zeroizing;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";

/// Symbol class. Disjoint from the default excluded set, so enabling symbols
/// with default exclusions still yields symbols.
pub const SYMBOLS: &str = "~/";

/// Options for one generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub excluded_chars: BTreeSet<char>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for GeneratorOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            uppercase: config.uppercase,
            lowercase: config.lowercase,
            digits: config.digits,
            symbols: config.symbols,
            excluded_chars: config.excluded_chars.chars().collect(),
        }
    }
}

/// Validated generator with its class alphabets precomputed.
#[derive(Debug, Clone)]
pub struct PasswordGenerator {
    length: usize,
    /// Enabled classes, in guarantee order, with exclusions removed.
    classes: Vec<Vec<char>>,
    /// Union of `classes`.
    allowed: Vec<char>,
}

impl PasswordGenerator {
    /// Validate `options` and build a generator.
    ///
    /// Fails with [`StrongboxError::InvalidConfiguration`] when the length is
    /// zero, when no class is enabled, or when exclusions empty an enabled class.
    pub fn new(options: &GeneratorOptions) -> Result<Self, StrongboxError> {
        if options.length == 0 {
            return Err(StrongboxError::InvalidConfiguration(
                "password length must be at least 1".to_string(),
            ));
        }

        let mut classes = Vec::new();
        for (enabled, name, alphabet) in [
            (options.uppercase, "uppercase", UPPERCASE),
            (options.lowercase, "lowercase", LOWERCASE),
            (options.digits, "digits", DIGITS),
            (options.symbols, "symbols", SYMBOLS),
        ] {
            if !enabled {
                continue;
            }
            let members: Vec<char> = alphabet
                .chars()
                .filter(|c| !options.excluded_chars.contains(c))
                .collect();
            if members.is_empty() {
                return Err(StrongboxError::InvalidConfiguration(format!(
                    "every {name} character is excluded"
                )));
            }
            classes.push(members);
        }

        if classes.is_empty() {
            return Err(StrongboxError::InvalidConfiguration(
                "no character classes enabled".to_string(),
            ));
        }

        let allowed = classes.iter().flatten().copied().collect();
        Ok(Self {
            length: options.length,
            classes,
            allowed,
        })
    }

    /// Build a generator from the `[generator]` config section.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, StrongboxError> {
        Self::new(&GeneratorOptions::from(config))
    }

    /// Length of every generated password.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The full allowed alphabet.
    pub fn allowed(&self) -> &[char] {
        &self.allowed
    }

    /// Generate one password.
    pub fn generate(&self) -> Result<SecretString, StrongboxError> {
        let mut bytes = Zeroizing::new(vec![0u8; self.length]);
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| StrongboxError::Internal("failed to draw random bytes".to_string()))?;

        let guaranteed = self.classes.len().min(self.length);
        let mut chars: Zeroizing<Vec<char>> = Zeroizing::new(Vec::with_capacity(self.length));
        for (i, &byte) in bytes.iter().enumerate() {
            let alphabet = if i < guaranteed {
                &self.classes[i]
            } else {
                &self.allowed
            };
            chars.push(alphabet[usize::from(byte) % alphabet.len()]);
        }

        chars.shuffle(&mut OsRng);
        Ok(SecretString::from(chars.iter().collect::<String>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use secrecy::ExposeSecret;

    fn options() -> GeneratorOptions {
        GeneratorOptions::default()
    }

    #[test]
    fn default_generates_twelve_chars_with_every_class() {
        let generator = PasswordGenerator::new(&options()).unwrap();
        let password = generator.generate().unwrap();
        let password = password.expose_secret();
        assert_eq!(password.chars().count(), 12);
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
        assert!(password.chars().any(|c| SYMBOLS.contains(c)));
    }

    #[test]
    fn zero_length_is_invalid() {
        let mut opts = options();
        opts.length = 0;
        assert!(matches!(
            PasswordGenerator::new(&opts),
            Err(StrongboxError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn all_classes_disabled_is_invalid() {
        let opts = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
            ..options()
        };
        assert!(matches!(
            PasswordGenerator::new(&opts),
            Err(StrongboxError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn fully_excluded_class_is_invalid() {
        let mut opts = options();
        opts.excluded_chars.extend(DIGITS.chars());
        let err = PasswordGenerator::new(&opts).unwrap_err();
        assert!(err.to_string().contains("digits"), "got {err}");
    }

    #[test]
    fn short_length_truncates_guarantees() {
        let mut opts = options();
        opts.length = 2;
        let generator = PasswordGenerator::new(&opts).unwrap();
        for _ in 0..50 {
            let password = generator.generate().unwrap();
            let password = password.expose_secret();
            assert_eq!(password.chars().count(), 2);
            // Only the first two classes are guaranteed.
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn single_class_only_uses_that_class() {
        let opts = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            symbols: false,
            length: 32,
            ..options()
        };
        let password = PasswordGenerator::new(&opts).unwrap().generate().unwrap();
        assert!(password.expose_secret().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn from_config_copies_exclusions() {
        let config = GeneratorConfig {
            excluded_chars: "0O1lI".to_string(),
            ..GeneratorConfig::default()
        };
        let generator = PasswordGenerator::from_config(&config).unwrap();
        assert!(!generator.allowed().contains(&'O'));
        assert!(!generator.allowed().contains(&'1'));
        assert!(generator.allowed().contains(&'~'));
    }

    #[test]
    fn consecutive_passwords_differ() {
        let mut opts = options();
        opts.length = 32;
        let generator = PasswordGenerator::new(&opts).unwrap();
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    proptest! {
        #[test]
        fn generated_passwords_satisfy_options(
            length in 1usize..64,
            uppercase in any::<bool>(),
            lowercase in any::<bool>(),
            digits in any::<bool>(),
            symbols in any::<bool>(),
            excluded in proptest::collection::btree_set(proptest::char::range('0', 'z'), 0..10),
        ) {
            let opts = GeneratorOptions {
                length,
                uppercase,
                lowercase,
                digits,
                symbols,
                excluded_chars: excluded,
            };
            let Ok(generator) = PasswordGenerator::new(&opts) else {
                return Ok(());
            };
            let password = generator.generate().unwrap();
            let password = password.expose_secret();

            prop_assert_eq!(password.chars().count(), length);
            prop_assert!(password.chars().all(|c| !opts.excluded_chars.contains(&c)));
            prop_assert!(password.chars().all(|c| generator.allowed().contains(&c)));

            let enabled = [uppercase, lowercase, digits, symbols].iter().filter(|on| **on).count();
            if length >= enabled {
                if uppercase {
                    prop_assert!(password.chars().any(|c| c.is_ascii_uppercase()));
                }
                if lowercase {
                    prop_assert!(password.chars().any(|c| c.is_ascii_lowercase()));
                }
                if digits {
                    prop_assert!(password.chars().any(|c| c.is_ascii_digit()));
                }
                if symbols {
                    prop_assert!(password.chars().any(|c| SYMBOLS.contains(c)));
                }
            }
        }
    }
}
