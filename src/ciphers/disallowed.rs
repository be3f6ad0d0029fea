// Disallowed cipher sets - complement of a profile's allowed suites
//
// A probe offers only the disallowed set; a server that accepts any of them is
// configured more permissively than the profile allows.

use std::collections::BTreeSet;

/// OpenSSL selector for every suite the remote tool implements
const OPENSSL_EVERYTHING: &str = "ALL:COMPLEMENTOFALL";

/// Native TLS 1.2 identifiers that are not in `allowed`
pub fn compute_disallowed_ciphers(allowed: &BTreeSet<u16>) -> BTreeSet<u16> {
    super::native_tls12_ids()
        .filter(|id| !allowed.contains(id))
        .collect()
}

/// OpenSSL cipher string selecting every suite except the `allowed` names
///
/// The remote `openssl` expands the string against its own suite table, so
/// suites no profile mentions are offered as well.
pub fn compute_disallowed_openssl_ciphers(allowed: &BTreeSet<String>) -> String {
    let mut selector = OPENSSL_EVERYTHING.to_string();
    for name in allowed {
        selector.push_str(":!");
        selector.push_str(name);
    }
    selector.push_str(":@SECLEVEL=0");
    selector
}
