use crate::graph::{Graph, NodeId};
use crate::order::{CommOrdering, Tio, INF};
use std::collections::HashMap;

#[test]
fn jointly_required_receives_share_rank_zero() {
    let mut g = Graph::default();
    let r1 = g.add_node("s/w1/read", &[]).unwrap();
    let r2 = g.add_node("s/w2/read", &[]).unwrap();
    let c = g.add_node("s/c", &[r1, r2]).unwrap();

    let tio = Tio::new(&g, c).expect("tio");
    let props = tio.properties();
    assert_eq!(props[&r1].mp, 2);
    assert_eq!(props[&r2].mp, 2);

    let ranks: HashMap<NodeId, usize> = tio.get_priorities().iter().map(|p| (p.op, p.rank)).collect();
    assert_eq!(ranks[&r1], 0);
    assert_eq!(ranks[&r2], 0);
    assert_eq!(tio.name(), "TIO");
}

#[test]
fn ranks_start_at_group_position_and_grow_with_mp() {
    // a 与 b 被 x 共同需要（mp=2）；c、d、e 被 y 共同需要（mp=3）；f 单独被需要（mp=INF）
    let mut g = Graph::default();
    let a = g.add_node("s/a/read", &[]).unwrap();
    let b = g.add_node("s/b/read", &[]).unwrap();
    let c = g.add_node("s/c/read", &[]).unwrap();
    let d = g.add_node("s/d/read", &[]).unwrap();
    let e = g.add_node("s/e/read", &[]).unwrap();
    let f = g.add_node("s/f/read", &[]).unwrap();
    let x = g.add_node("s/x", &[a, b]).unwrap();
    let y = g.add_node("s/y", &[c, d, e]).unwrap();
    let z = g.add_node("s/z", &[f]).unwrap();
    let root = g.add_node("s/loss", &[x, y, z]).unwrap();

    let tio = Tio::new(&g, root).expect("tio");
    let props = tio.properties();
    // loss 同时依赖全部 6 个接收，mp 不超过 6
    assert_eq!(props[&a].mp, 2);
    assert_eq!(props[&c].mp, 3);
    assert_eq!(props[&f].mp, 6);

    let pr = tio.get_priorities();
    assert_eq!(pr.len(), 6);
    let ranks: Vec<usize> = pr.iter().map(|p| p.rank).collect();
    assert_eq!(ranks, vec![0, 0, 2, 2, 2, 5]);

    let by_op: HashMap<NodeId, usize> = pr.iter().map(|p| (p.op, p.rank)).collect();
    assert_eq!(by_op[&a], 0);
    assert_eq!(by_op[&b], 0);
    assert_eq!(by_op[&c], 2);
    assert_eq!(by_op[&e], 2);
    assert_eq!(by_op[&f], 5);
}

#[test]
fn ranks_are_monotone_in_mp_and_ties_share_rank() {
    let mut g = Graph::default();
    let mut recvs = Vec::new();
    for i in 0..8 {
        recvs.push(g.add_node(format!("s/v{i}/read"), &[]).unwrap());
    }
    let p0 = g.add_node("s/p0", &recvs[0..2]).unwrap();
    let p1 = g.add_node("s/p1", &recvs[2..5]).unwrap();
    let p2 = g.add_node("s/p2", &recvs[4..6]).unwrap();
    let p3 = g.add_node("s/p3", &recvs[6..7]).unwrap();
    let p4 = g.add_node("s/p4", &recvs[7..8]).unwrap();
    let root = g.add_node("s/loss", &[p0, p1, p2, p3, p4]).unwrap();

    let tio = Tio::new(&g, root).expect("tio");
    let props = tio.properties();
    let pr = tio.get_priorities();
    assert_eq!(pr.len(), recvs.len());
    for w in pr.windows(2) {
        let (m0, m1) = (props[&w[0].op].mp, props[&w[1].op].mp);
        assert!(m0 <= m1, "mp must be sorted");
        assert!(w[0].rank <= w[1].rank, "ranks must be sorted");
        assert_eq!(m0 == m1, w[0].rank == w[1].rank);
    }
    assert_eq!(pr[0].rank, 0);
}

#[test]
fn receive_without_joint_dependency_keeps_infinite_mp() {
    let mut g = Graph::default();
    let r = g.add_node("s/w/read", &[]).unwrap();
    let y = g.add_node("s/y", &[r]).unwrap();
    let tio = Tio::new(&g, y).expect("tio");
    assert_eq!(tio.properties()[&r].mp, INF);
    assert_eq!(tio.properties()[&r].p, 0);
    let pr = tio.get_priorities();
    assert_eq!(pr.len(), 1);
    assert_eq!(pr[0].rank, 0);
}
