use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use errwrap::{args, find, is, unwrap, Cause, Error, IntoCause, Joined};

#[derive(Debug)]
struct CustomError {
    msg: String,
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl StdError for CustomError {}

fn custom(msg: &str) -> Arc<CustomError> {
    Arc::new(CustomError {
        msg: msg.to_string(),
    })
}

#[test]
fn test_new() {
    let err = Error::new("test");
    assert_eq!(err.to_string(), "test");

    let err = Error::newf("test %v", args![2]);
    assert_eq!(err.to_string(), "test 2");
}

#[test]
fn test_is() {
    let err = Error::new("test");
    assert!(is(&err, &err));

    let err2 = Error::wrap(err.clone(), "wrap");
    assert!(is(&err2, &err));

    let err3 = Error::wrap(err2.clone(), "wrap");
    assert!(is(&err3, &err2));
    assert!(is(&err3, &err));
}

#[test]
fn test_is_rejects_unrelated() {
    let err = Error::wrap(Error::new("base"), "ctx");
    assert!(!is(&err, &Error::new("base")));
    assert!(!is(&Error::new("ctx"), &err));
}

#[test]
fn test_find_in_join() {
    let custom_err = custom("this is a custom error");
    let err = Error::join([
        custom_err.clone().into_cause(),
        Error::new("some other error").into_cause(),
    ]);

    let target = find::<CustomError>(&err).expect("CustomError should be in the chain");
    assert!(std::ptr::eq(target, &*custom_err));
}

#[test]
fn test_find_through_wrap() {
    let custom_err = custom("custom");
    let wrapped = Error::wrap(custom_err.clone(), "context");

    let target = find::<CustomError>(&wrapped).unwrap();
    assert_eq!(target.msg, "custom");
}

#[test]
fn test_marshal_single_error() {
    let err = Error::new("simple error");
    assert_eq!(err.to_json().unwrap(), r#"["simple error"]"#);
}

#[test]
fn test_marshal_wrapped_errors() {
    let base = Error::new("base error");
    let err = Error::wrap(base, "context");
    assert_eq!(err.to_json().unwrap(), r#"["context","base error"]"#);
}

#[test]
fn test_marshal_natural_newlines() {
    let err = Error::new("line1\nline2\nline3");
    assert_eq!(err.to_json().unwrap(), r#"["line1","line2","line3"]"#);
    assert_eq!(err.to_json_vec().unwrap(), br#"["line1","line2","line3"]"#);
}

#[test]
fn test_marshal_empty_message() {
    let err = Error::new("");
    assert_eq!(err.to_json().unwrap(), r#"[""]"#);
}

#[test]
fn test_marshal_inside_struct() {
    #[derive(serde::Serialize)]
    struct Response {
        ok: bool,
        error: Error,
    }

    let response = Response {
        ok: false,
        error: Error::wrap(Error::new("timeout"), "fetching"),
    };
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"ok":false,"error":["fetching","timeout"]}"#
    );
}

#[test]
fn test_unwrap_container_returns_joined() {
    let inner = Error::new("inner");
    let outer = Error::wrap(inner.clone(), "outer");

    let unwrapped = unwrap(&outer).unwrap();
    assert!(unwrapped.is::<Joined>());
    assert!(is(unwrapped, &inner));

    assert_eq!(outer.cause().to_string(), unwrapped.to_string());
}

#[test]
fn test_unwrap_std_error_uses_source() {
    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer {
        #[source]
        inner: CustomError,
    }

    let err = Outer {
        inner: CustomError {
            msg: "root".to_string(),
        },
    };
    let next = unwrap(&err).unwrap();
    assert_eq!(next.to_string(), "root");
    assert!(unwrap(next).is_none());
}

#[test]
fn test_unwrap_leaf_is_none() {
    let err = Error::new("leaf");
    let leaf = unwrap(&err).unwrap();
    assert!(unwrap(leaf).is_none());
}

#[test]
fn test_source_chain_is_visible_to_std() {
    let err = Error::wrap(Error::new("base"), "ctx");
    let source = err.source().unwrap();
    assert_eq!(source.to_string(), "ctx\nbase");
}

#[test]
fn test_deeply_nested_wraps() {
    let base = Error::new("base");
    let err1 = Error::wrap(base.clone(), "level1");
    let err2 = Error::wrap(err1.clone(), "level2");
    let err3 = Error::wrap(err2.clone(), "level3");

    assert!(is(&err3, &base));
    assert!(is(&err3, &err1));
    assert!(is(&err3, &err2));
    assert_eq!(err3.to_string(), "level3\nlevel2\nlevel1\nbase");
}

#[test]
fn test_chain_preserves_containers_in_join() {
    let err1 = Error::new("error1");
    let err2 = Error::wrap(err1.clone(), "error2");
    let err3 = Error::wrap(err2.clone(), "error3");

    assert!(find::<Error>(&err3).is_some());
    assert!(is(&err3, &err1));
    assert!(is(&err3, &err2));
}

#[test]
fn test_mixed_error_types_in_chain() {
    let std_err: Cause = Arc::new(std::io::Error::other("std error"));
    let err1 = Error::wrap(std_err.clone(), "wrapped once");
    let custom_err = custom("custom");
    let err2 = Error::wrap(custom_err, "wrapped custom");
    let joined = Error::join([err1, err2]);

    assert!(is(&joined, &*std_err));
    assert!(find::<CustomError>(&joined).is_some());
}

#[test]
fn test_join_multiple_errors() {
    let err1 = Error::new("error1");
    let err2 = Error::new("error2");
    let err3 = Error::new("error3");

    let joined = Error::join([err1.clone(), err2.clone(), err3.clone()]);

    assert!(is(&joined, &err1));
    assert!(is(&joined, &err2));
    assert!(is(&joined, &err3));
    assert_eq!(joined.to_string(), "error1\nerror2\nerror3");
}

#[test]
fn test_join_skips_absent() {
    let err1 = Error::new("error1");
    let joined = Error::join([Some(err1.clone()), None, None]);

    assert!(is(&joined, &err1));
    assert_eq!(joined.to_json().unwrap(), r#"["error1"]"#);
}

#[test]
fn test_wrap_absent() {
    let err = Error::wrap(None::<Error>, "context");
    assert_eq!(err.to_string(), "context");

    let err = Error::wrapf(None::<Cause>, "context: %d", args![42]);
    assert_eq!(err.to_string(), "context: 42");
}

#[test]
fn test_wrapf_with_cause() {
    let base = Error::new("refused");
    let err = Error::wrapf(base.clone(), "dial %s:%d", args!["db", 5432]);
    assert_eq!(err.to_string(), "dial db:5432\nrefused");
    assert!(is(&err, &base));
}

#[test]
fn test_wrap_anyhow() {
    let err = Error::wrap(anyhow::anyhow!("from anyhow"), "ctx");
    assert_eq!(err.to_string(), "ctx\nfrom anyhow");
}

#[test]
fn test_deep_error_chain() {
    let base = Error::new("base");
    let mut current = Error::wrap(base.clone(), "level0");

    for _ in 1..1000 {
        current = Error::wrap(current, "level");
    }

    assert!(is(&current, &base));
    assert!(find::<Error>(&current).is_some());
    assert_eq!(current.to_string().lines().count(), 1001);
}

#[test]
fn test_very_deep_join_chain() {
    let base = custom("bottom");
    let mut current = Error::join([base.clone()]);

    for _ in 0..5000 {
        current = Error::join([current]);
    }

    assert!(is(&current, &*base));
    assert!(std::ptr::eq(find::<CustomError>(&current).unwrap(), &*base));
}

#[test]
fn test_debug_of_very_deep_chain() {
    let base = Error::new("base");
    let mut current = Error::wrap(base, "level0");

    for _ in 1..5000 {
        current = Error::wrap(current, "level");
    }

    let debug = format!("{current:?}");
    assert!(debug.starts_with("Error(\"level\\nlevel"));
    assert!(debug.ends_with("level0\\nbase\")"));

    let result: Result<(), Error> = Err(current);
    assert!(format!("{result:?}").starts_with("Err(Error("));
}

#[test]
fn test_debug_of_joined() {
    let err = Error::join([Error::new("a"), Error::new("b")]);
    assert_eq!(format!("{err:?}"), r#"Error("a\nb")"#);

    let joined = unwrap(&err).unwrap().downcast_ref::<Joined>().unwrap();
    assert_eq!(format!("{joined:?}"), r#"Joined(["a", "b"])"#);
}

#[test]
fn test_drop_of_deep_chain_with_formatted_levels() {
    // A small stack makes per-level recursion in drop fail quickly.
    let handle = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(|| {
            let base = Error::new("x");
            let mut current = Error::wrap(base.clone(), "x");

            for _ in 0..8000 {
                current = Error::wrap(current.format(args![]), "x");
            }

            assert!(is(&current, &base));
            assert!(find::<errwrap::Formatted>(&current).is_some());
            drop(current);
            assert_eq!(base.to_string(), "x");
        })
        .unwrap();
    handle.join().unwrap();
}
