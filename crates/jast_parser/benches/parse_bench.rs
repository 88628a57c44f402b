use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jast_parser::{parse, ParseOptions};

// A medium-size Java source (~100 lines) with various constructs
const JAVA_SOURCE: &str = r#"
package com.example.users;

import java.util.*;
import java.util.function.Function;
import static java.util.Objects.requireNonNull;

/**
 * Keeps users in memory.
 */
@SuppressWarnings("unchecked")
public class UserService<K extends Comparable<K>, V extends User> implements Iterable<V> {
    private static final int DEFAULT_CAPACITY = 1 << 4;
    private final Map<K, List<V>> users = new HashMap<>();
    private int[] counts = new int[DEFAULT_CAPACITY], spare[];
    private volatile long nextId = 0x1F_FFL;

    static {
        System.out.println("loaded " + UserService.class.getName());
    }

    public UserService() {
        this(DEFAULT_CAPACITY);
    }

    public UserService(int capacity) {
        super();
        counts = new int[capacity];
    }

    /** Add a user under {@code key}. */
    public synchronized V add(K key, V user) throws IllegalStateException {
        requireNonNull(user, "user");
        users.computeIfAbsent(key, k -> new ArrayList<>()).add(user);
        counts[key.hashCode() & (counts.length - 1)]++;
        nextId += 1;
        return user;
    }

    public <R> List<R> map(Function<? super V, ? extends R> fn) {
        List<R> out = new ArrayList<R>();
        for (List<V> group : users.values()) {
            for (int i = 0, n = group.size(); i < n; i++) {
                out.add(fn.apply(group.get(i)));
            }
        }
        return out;
    }

    public int total() {
        int sum = 0;
        outer:
        for (int c : counts) {
            if (c < 0) {
                continue outer;
            } else if (c > 1000 && !(c % 2 == 0)) {
                break;
            }
            sum += c >>> 1 >> 2 << 3;
        }
        return sum > 0 ? sum : -1;
    }

    @Override
    public Iterator<V> iterator() {
        List<V> all = new ArrayList<>();
        users.values().forEach(all::addAll);
        return all.iterator();
    }

    public String describe(Object value) {
        switch (value.hashCode() % 3) {
            case 0:
            case 1:
                return "small";
            default:
                break;
        }
        try (Scanner scanner = new Scanner((String) value)) {
            return scanner.next();
        } catch (IllegalArgumentException | NullPointerException e) {
            throw new RuntimeException(e);
        } finally {
            assert value != null : "value";
        }
    }

    enum Kind {
        ADMIN("a") {
            @Override
            String label() { return "admin"; }
        },
        GUEST("g");

        private final String code;

        Kind(String code) { this.code = code; }

        String label() { return code; }
    }

    interface Listener {
        int PRIORITY = 1;
        void changed(User user);
    }
}
"#;

fn bench_parse_java(c: &mut Criterion) {
    let options = ParseOptions::default();
    c.bench_function("parse_java_medium", |b| {
        b.iter(|| {
            let output = parse(black_box(JAVA_SOURCE), &options);
            black_box(output).ok();
        });
    });
}

criterion_group!(benches, bench_parse_java);
criterion_main!(benches);
