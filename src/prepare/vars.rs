use std::{collections::HashMap, sync::LazyLock};

use rand::Rng;
use regex::{Captures, Regex};

static DATA_SOURCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{data\.(.*?)\}").expect("valid data source regex"));

static RANDOM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{Rand\.(.*?)\}").expect("valid random regex"));

const RFC1123_SUBDOMAIN: &str = "RFC1123Subdomain";
const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const RANDOM_SUFFIX_LEN: usize = 8;

/// Replace `${data.<key>}` with the value of `key` in `data`, then every
/// `${Rand.RFC1123Subdomain}` with a fresh random name.
///
/// Unknown keys and generators are left untouched.
pub fn inject_values<R: Rng>(
    input: &str,
    data: &HashMap<String, String>,
    rng: &mut R,
) -> String {
    let with_data = DATA_SOURCE_REGEX.replace_all(input, |caps: &Captures<'_>| {
        data.get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_owned())
    });

    RANDOM_REGEX
        .replace_all(&with_data, |caps: &Captures<'_>| match &caps[1] {
            RFC1123_SUBDOMAIN => rfc1123_subdomain(rng),
            _ => caps[0].to_owned(),
        })
        .into_owned()
}

/// `op-` followed by eight lower-case alphanumerics.
fn rfc1123_subdomain<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(CHARSET[rng.random_range(0..CHARSET.len())]))
        .collect();
    format!("op-{suffix}")
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    fn data() -> HashMap<String, String> {
        [("tenantID", "0000-1111"), ("accountID", "123456789012")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn injects_data_source_values() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(
            inject_values(
                "tenant: ${data.tenantID}\naccount: ${data.accountID}\nagain: ${data.tenantID}\n",
                &data(),
                &mut rng
            ),
            "tenant: 0000-1111\naccount: 123456789012\nagain: 0000-1111\n"
        );
    }

    #[test]
    fn leaves_unknown_keys() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(
            inject_values("id: ${data.missing} ${Rand.UUID} $HOME", &data(), &mut rng),
            "id: ${data.missing} ${Rand.UUID} $HOME"
        );
    }

    #[test]
    fn each_random_name_is_fresh() {
        let mut rng = SmallRng::seed_from_u64(7);
        let output = inject_values(
            "a: ${Rand.RFC1123Subdomain}\nb: ${Rand.RFC1123Subdomain}\n",
            &HashMap::new(),
            &mut rng,
        );

        let names: Vec<_> = output
            .lines()
            .map(|line| line.split_once(": ").unwrap().1)
            .collect();
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
        for name in names {
            let suffix = name.strip_prefix("op-").unwrap();
            assert_eq!(suffix.len(), 8);
            assert!(suffix.bytes().all(|b| CHARSET.contains(&b)), "{name}");
        }
    }

    #[test]
    fn data_values_may_request_random_names() {
        let mut rng = SmallRng::seed_from_u64(7);
        let data = HashMap::from([("bucket".to_owned(), "${Rand.RFC1123Subdomain}".to_owned())]);
        let output = inject_values("name: ${data.bucket}", &data, &mut rng);
        assert!(output.starts_with("name: op-"), "{output}");
    }
}
