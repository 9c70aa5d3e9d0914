use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=MITIE_LIB_DIR");
    println!("cargo:rerun-if-env-changed=MITIE_STATIC");

    if let Ok(dir) = env::var("MITIE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={dir}");
    }

    let kind = match env::var("MITIE_STATIC").as_deref() {
        Ok("1") | Ok("true") => "static",
        _ => "dylib",
    };
    println!("cargo:rustc-link-lib={kind}=mitie");

    // The static archive is C++ and needs its runtime.
    if kind == "static" {
        let target = env::var("TARGET").unwrap_or_default();
        if target.contains("apple") {
            println!("cargo:rustc-link-lib=dylib=c++");
        } else if !target.contains("msvc") {
            println!("cargo:rustc-link-lib=dylib=stdc++");
        }
    }
}
